use super::{ldlt, Matrix, MatrixOp};
use crate::error::{AdError, Result};
use crate::float::Float;
use crate::scalar::Scalar;

/// Largest `|m[i,j] - m[j,i]|` still accepted as symmetric.
const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// Inverse of a symmetric positive-definite matrix.
///
/// The input is checked to be square and symmetric before anything is
/// factorized; the symmetrized matrix `½(M + Mᵀ)` is then factorized and a
/// non-positive pivot is reported as [`AdError::NotPositiveDefinite`].
///
/// With `B` the inverse, the derivative with respect to the symmetrized input
/// is `∂B_kl/∂M_ij = -½ (B_ki B_jl + B_kj B_il)`: every entry of the inverse
/// depends on every entry of the input.
pub struct InverseSpd;

const NAME: &str = "inverse_spd";

fn check_symmetric<F: Float>(m: &Matrix<F>) -> Result<()> {
    let tol = F::from_f64(SYMMETRY_TOLERANCE).unwrap();
    let n = m.rows();
    for i in 0..n {
        for j in (i + 1)..n {
            let (upper, lower) = (m[(i, j)], m[(j, i)]);
            let diff = (upper - lower).abs();
            if diff.is_nan() || diff > tol {
                return Err(AdError::NotSymmetric {
                    op: NAME,
                    row: i,
                    col: j,
                    upper: upper.to_f64().unwrap_or(f64::NAN),
                    lower: lower.to_f64().unwrap_or(f64::NAN),
                });
            }
        }
    }
    Ok(())
}

impl<F: Float> MatrixOp<F> for InverseSpd {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute_value(&self, m: &Matrix<F>) -> Result<Matrix<F>> {
        if !m.is_square() {
            return Err(AdError::NotSquare {
                op: NAME,
                rows: m.rows(),
                cols: m.cols(),
            });
        }
        check_symmetric(m)?;
        let half = F::from_f64(0.5).unwrap();
        let sym = Matrix::from_fn(m.rows(), m.cols(), |i, j| half * (m[(i, j)] + m[(j, i)]));
        let factors = ldlt::factor(NAME, &sym)?;
        Ok(factors.solve(&Matrix::identity(m.rows())))
    }

    fn compute_partials(
        &self,
        input: &Matrix<F>,
        output: &Matrix<F>,
        (k, l): (usize, usize),
        block: &mut [F],
    ) {
        let n = input.rows();
        let half = F::from_f64(0.5).unwrap();
        let b = output;
        for i in 0..n {
            for j in 0..n {
                block[i * n + j] = -half * (b[(k, i)] * b[(j, l)] + b[(k, j)] * b[(i, l)]);
            }
        }
    }
}

/// Inverse of a symmetric positive-definite matrix of any scalar kind.
pub fn inverse_spd<S: Scalar>(m: &Matrix<S>) -> Result<Matrix<S>> {
    S::apply_matrix(&InverseSpd, m)
}
