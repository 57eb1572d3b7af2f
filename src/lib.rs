pub mod api;
pub mod arena;
pub mod dual;
pub mod elementary;
pub mod error;
pub mod evaluator;
pub mod float;
pub mod functions;
pub mod matrix;
pub mod scalar;
pub mod services;
pub mod var;
mod traits;

#[cfg(feature = "nalgebra")]
pub mod nalgebra_support;
#[cfg(feature = "parallel")]
pub mod parallel;

pub use api::{derivative, grad, jacobian, jvp, value_and_grad, value_and_grad_in, vjp};
pub use arena::{Arena, ArenaGuard};
pub use dual::Dual;
pub use elementary::Elementary;
pub use error::{AdError, Result};
pub use evaluator::{GradientEvaluator, LogDensity};
pub use float::{Float, Real};
pub use matrix::{Matrix, MatrixOp};
pub use scalar::Scalar;
pub use var::Var;

/// Type alias for forward-mode dual numbers over `f64`.
pub type Dual64 = Dual<f64>;
/// Type alias for forward-mode dual numbers over `f32`.
pub type Dual32 = Dual<f32>;
/// Type alias for reverse-mode variables over `f64`.
pub type Var64 = Var<f64>;
/// Type alias for reverse-mode variables over `f32`.
pub type Var32 = Var<f32>;
