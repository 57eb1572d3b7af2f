//! nalgebra adapters.
//!
//! Conversions between [`Matrix`] and `DMatrix`, plus thin wrappers taking
//! and returning `DVector` / `DMatrix`.

use nalgebra::{DMatrix, DVector};

use crate::arena::ArenaThreadLocal;
use crate::error::Result;
use crate::evaluator::{GradientEvaluator, LogDensity};
use crate::matrix::{self, Matrix};
use crate::scalar::Scalar;
use crate::var::Var;

impl<T: nalgebra::Scalar> From<&DMatrix<T>> for Matrix<T> {
    fn from(m: &DMatrix<T>) -> Self {
        Matrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)].clone())
    }
}

impl<T: nalgebra::Scalar> From<Matrix<T>> for DMatrix<T> {
    fn from(m: Matrix<T>) -> Self {
        let (rows, cols) = m.shape();
        DMatrix::from_row_iterator(rows, cols, m.into_vec())
    }
}

/// Gradient of `f` at `x`, returned as a `DVector`.
pub fn grad_nalgebra<F: ArenaThreadLocal>(
    f: impl FnOnce(&[Var<F>]) -> Result<Var<F>>,
    x: &DVector<F>,
) -> Result<DVector<F>> {
    crate::api::grad(f, x.as_slice()).map(DVector::from_vec)
}

/// One evaluator call on nalgebra types: `(value, gradient)`.
pub fn evaluate_nalgebra<F, M>(
    evaluator: &mut GradientEvaluator<F, M>,
    x: &DVector<F>,
) -> Result<(F, DVector<F>)>
where
    F: ArenaThreadLocal + Scalar<Float = F>,
    M: LogDensity<F>,
{
    let (value, gradient) = evaluator.evaluate(x.as_slice())?;
    Ok((value, DVector::from_vec(gradient)))
}

/// [`inverse_spd`](crate::matrix::inverse_spd) on a `DMatrix` of any scalar kind.
pub fn inverse_spd_nalgebra<S: Scalar + nalgebra::Scalar>(m: &DMatrix<S>) -> Result<DMatrix<S>> {
    matrix::inverse_spd(&Matrix::from(m)).map(DMatrix::from)
}
