//! The [`Scalar`] trait for writing AD-generic numeric code.
//!
//! Functions written as `fn f<S: Scalar>(x: &[S]) -> Result<S, AdError>` work
//! unchanged with plain `f64`, `Dual<f64>` and `Var<f64>`: the three scalar
//! kinds share one capability, applying an [`Elementary`] primitive.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::FromPrimitive;

use crate::arena::ArenaThreadLocal;
use crate::dual::Dual;
use crate::elementary::{self, Elementary};
use crate::error::Result;
use crate::float::Float;
use crate::matrix::{self, Matrix, MatrixOp};
use crate::var::Var;

/// The central trait for AD-generic numeric code.
pub trait Scalar:
    Copy
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The underlying primitive float type.
    type Float: Float;

    /// Lift a plain float to this scalar (constant, zero derivative).
    fn from_f(val: Self::Float) -> Self;

    /// Extract the primal value.
    fn value(&self) -> Self::Float;

    /// Apply a primitive to operands of this kind.
    fn apply(op: &dyn Elementary<Self::Float>, args: &[Self]) -> Result<Self>;

    /// Apply a joint matrix operation to a matrix of this kind.
    fn apply_matrix(op: &dyn MatrixOp<Self::Float>, input: &Matrix<Self>) -> Result<Matrix<Self>>;

    /// Lift an `f64` literal.
    #[inline]
    fn lit(val: f64) -> Self {
        Self::from_f(<Self::Float as FromPrimitive>::from_f64(val).unwrap())
    }

    #[inline]
    fn zero() -> Self {
        Self::from_f(<Self::Float as num_traits::Zero>::zero())
    }
}

impl Scalar for f32 {
    type Float = f32;

    #[inline]
    fn from_f(val: f32) -> Self {
        val
    }

    #[inline]
    fn value(&self) -> f32 {
        *self
    }

    fn apply(op: &dyn Elementary<f32>, args: &[Self]) -> Result<Self> {
        elementary::eval(op, args)
    }

    fn apply_matrix(op: &dyn MatrixOp<f32>, input: &Matrix<Self>) -> Result<Matrix<Self>> {
        matrix::eval(op, input)
    }
}

impl Scalar for f64 {
    type Float = f64;

    #[inline]
    fn from_f(val: f64) -> Self {
        val
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    fn apply(op: &dyn Elementary<f64>, args: &[Self]) -> Result<Self> {
        elementary::eval(op, args)
    }

    fn apply_matrix(op: &dyn MatrixOp<f64>, input: &Matrix<Self>) -> Result<Matrix<Self>> {
        matrix::eval(op, input)
    }
}

impl<F: Float> Scalar for Dual<F> {
    type Float = F;

    #[inline]
    fn from_f(val: F) -> Self {
        Dual::constant(val)
    }

    #[inline]
    fn value(&self) -> F {
        self.value
    }

    fn apply(op: &dyn Elementary<F>, args: &[Self]) -> Result<Self> {
        elementary::forward(op, args)
    }

    fn apply_matrix(op: &dyn MatrixOp<F>, input: &Matrix<Self>) -> Result<Matrix<Self>> {
        matrix::forward(op, input)
    }
}

impl<F: ArenaThreadLocal> Scalar for Var<F> {
    type Float = F;

    #[inline]
    fn from_f(val: F) -> Self {
        Var::constant(val)
    }

    #[inline]
    fn value(&self) -> F {
        self.value
    }

    fn apply(op: &dyn Elementary<F>, args: &[Self]) -> Result<Self> {
        elementary::record(op, args)
    }

    fn apply_matrix(op: &dyn MatrixOp<F>, input: &Matrix<Self>) -> Result<Matrix<Self>> {
        matrix::record(op, input)
    }
}
