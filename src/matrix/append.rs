//! Structural concatenation.
//!
//! Each output entry is a copy of exactly one source entry, so its derivative
//! is 1 with respect to that entry and 0 for all others. For tape variables
//! that is the source handle itself; no node is recorded.

use super::Matrix;
use crate::error::{AdError, Result};

/// `[A B]`: place the columns of `b` after those of `a`.
///
/// Works for any mix of matrices, column vectors and row vectors as long as
/// the row counts agree.
pub fn append_col<T: Clone>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    if a.rows() != b.rows() {
        return Err(AdError::SizeMismatch {
            op: "append_col",
            lhs_name: "rows of A",
            lhs: a.rows(),
            rhs_name: "rows of B",
            rhs: b.rows(),
        });
    }
    let split = a.cols();
    Ok(Matrix::from_fn(a.rows(), a.cols() + b.cols(), |i, j| {
        if j < split {
            a[(i, j)].clone()
        } else {
            b[(i, j - split)].clone()
        }
    }))
}

/// `[A; B]`: place the rows of `b` below those of `a`.
pub fn append_row<T: Clone>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    if a.cols() != b.cols() {
        return Err(AdError::SizeMismatch {
            op: "append_row",
            lhs_name: "columns of A",
            lhs: a.cols(),
            rhs_name: "columns of B",
            rhs: b.cols(),
        });
    }
    let split = a.rows();
    Ok(Matrix::from_fn(a.rows() + b.rows(), a.cols(), |i, j| {
        if i < split {
            a[(i, j)].clone()
        } else {
            b[(i - split, j)].clone()
        }
    }))
}
