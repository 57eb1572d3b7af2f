//! Unpivoted LDLᵀ factorization for symmetric matrices.
//!
//! Without pivoting, every pivot `d_j` is positive exactly when the matrix is
//! positive definite, so the factorization doubles as the definiteness check.

use super::Matrix;
use crate::error::{AdError, Result};
use crate::float::Float;

/// `A = L·D·Lᵀ` with unit lower-triangular `L` and diagonal `D`.
pub struct Ldlt<F> {
    /// Strictly lower part holds `L`; the diagonal holds `D`.
    factors: Matrix<F>,
}

/// Factorize the symmetric matrix `a`, reading only its lower triangle.
///
/// Fails on the first pivot that is not strictly positive and finite.
// Explicit indexing mirrors the textbook recurrence
#[allow(clippy::needless_range_loop)]
pub fn factor<F: Float>(op: &'static str, a: &Matrix<F>) -> Result<Ldlt<F>> {
    let n = a.rows();
    debug_assert!(a.is_square());
    let mut f = a.clone();

    for j in 0..n {
        let mut d = f[(j, j)];
        for k in 0..j {
            let l = f[(j, k)];
            d = d - l * l * f[(k, k)];
        }
        if !d.is_finite() || d <= F::zero() {
            return Err(AdError::NotPositiveDefinite {
                op,
                pivot: j,
                value: d.to_f64().unwrap_or(f64::NAN),
            });
        }
        f[(j, j)] = d;

        for i in (j + 1)..n {
            let mut s = f[(i, j)];
            for k in 0..j {
                s = s - f[(i, k)] * f[(j, k)] * f[(k, k)];
            }
            f[(i, j)] = s / d;
        }
    }

    Ok(Ldlt { factors: f })
}

impl<F: Float> Ldlt<F> {
    pub fn dim(&self) -> usize {
        self.factors.rows()
    }

    /// Pivots `D`.
    pub fn diagonal(&self) -> Vec<F> {
        (0..self.dim()).map(|i| self.factors[(i, i)]).collect()
    }

    /// Solve `A·x = b`.
    #[allow(clippy::needless_range_loop)]
    pub fn solve_vec(&self, b: &[F]) -> Vec<F> {
        let n = self.dim();
        debug_assert_eq!(b.len(), n);
        let f = &self.factors;

        // L·y = b
        let mut x = b.to_vec();
        for i in 1..n {
            for k in 0..i {
                x[i] = x[i] - f[(i, k)] * x[k];
            }
        }
        // D·z = y
        for i in 0..n {
            x[i] = x[i] / f[(i, i)];
        }
        // Lᵀ·x = z
        for i in (0..n).rev() {
            for k in (i + 1)..n {
                x[i] = x[i] - f[(k, i)] * x[k];
            }
        }
        x
    }

    /// Solve `A·X = B` column by column.
    pub fn solve(&self, b: &Matrix<F>) -> Matrix<F> {
        let mut out = Matrix::zeros(b.rows(), b.cols());
        for j in 0..b.cols() {
            let col: Vec<F> = (0..b.rows()).map(|i| b[(i, j)]).collect();
            for (i, v) in self.solve_vec(&col).into_iter().enumerate() {
                out[(i, j)] = v;
            }
        }
        out
    }
}
