//! Error types for primal evaluation.
//!
//! Every failure is raised while the primal value is being computed, before a
//! node is recorded, so a failed evaluation never leaves a half-built tape.

use thiserror::Error;

/// Errors raised by primitives, matrix operations and the arena.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdError {
    /// A scalar operand lies outside the primitive's domain.
    #[error("{op}: {operand} = {value} is not {requirement}")]
    Domain {
        op: &'static str,
        operand: &'static str,
        value: f64,
        requirement: &'static str,
    },

    /// Two operands disagree on a dimension that must match.
    #[error("{op}: {lhs_name} ({lhs}) does not match {rhs_name} ({rhs})")]
    SizeMismatch {
        op: &'static str,
        lhs_name: &'static str,
        lhs: usize,
        rhs_name: &'static str,
        rhs: usize,
    },

    /// A square matrix was required.
    #[error("{op}: expected a square matrix, got {rows}x{cols}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    /// A symmetric matrix was required.
    #[error("{op}: matrix is not symmetric: m[{row},{col}] = {upper} but m[{col},{row}] = {lower}")]
    NotSymmetric {
        op: &'static str,
        row: usize,
        col: usize,
        upper: f64,
        lower: f64,
    },

    /// Factorization produced a non-positive (or non-finite) pivot.
    #[error("{op}: matrix is not positive definite: pivot {pivot} is {value}")]
    NotPositiveDefinite {
        op: &'static str,
        pivot: usize,
        value: f64,
    },

    /// The arena hit its node limit during recording.
    #[error("arena exhausted: node limit of {capacity} reached")]
    ArenaExhausted { capacity: usize },
}

impl AdError {
    /// Whether this is a domain error, i.e. the proposal that produced it is
    /// invalid but the process can continue.
    pub fn is_domain(&self) -> bool {
        !matches!(self, AdError::ArenaExhausted { .. })
    }

    /// Name of the operation that failed, if any.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            AdError::Domain { op, .. }
            | AdError::SizeMismatch { op, .. }
            | AdError::NotSquare { op, .. }
            | AdError::NotSymmetric { op, .. }
            | AdError::NotPositiveDefinite { op, .. } => Some(op),
            AdError::ArenaExhausted { .. } => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = AdError> = std::result::Result<T, E>;
