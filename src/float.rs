use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive};

/// Marker trait for base floating-point types (`f32`, `f64`).
///
/// Bundles the numeric and utility traits needed by the tape and the matrix
/// routines. Only primitive float types implement this; AD wrapper types do not.
pub trait Float:
    NumFloat + FloatConst + FromPrimitive + Copy + Send + Sync + Default + Debug + Display + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}

/// Value type a [`Dual`](crate::Dual) can carry.
///
/// Satisfied by the primitive floats and by `Dual<T>` itself, so duals nest
/// for higher-order derivatives.
pub trait Real: NumFloat + FloatConst + Debug {}

impl<T: NumFloat + FloatConst + Debug> Real for T {}
