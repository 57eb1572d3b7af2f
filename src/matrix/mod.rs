//! Dense matrices of plain, dual or tape scalars.
//!
//! Two derivative shapes coexist. Elementwise operations apply a scalar
//! [`Elementary`] primitive to each entry independently ([`elementwise`]).
//! Joint operations such as [`inverse_spd`] implement [`MatrixOp`] and record,
//! for every output entry, partials with respect to every input entry.

mod append;
mod inverse_spd;
pub mod ldlt;
mod op;

use std::ops::{Index, IndexMut};

pub use append::{append_col, append_row};
pub use inverse_spd::{inverse_spd, InverseSpd};
pub use op::{eval, forward, record, record_in, MatrixOp};

use crate::elementary::Elementary;
use crate::error::{AdError, Result};
use crate::float::Float;
use crate::scalar::Scalar;

/// Row-major dense matrix. Vectors are `n×1`, row vectors `1×n`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Build a `rows × cols` matrix from row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "data length {} does not fit a {rows}x{cols} matrix",
            data.len()
        );
        Matrix { rows, cols, data }
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Matrix { rows, cols, data }
    }

    pub fn column_vector(data: Vec<T>) -> Self {
        let rows = data.len();
        Matrix {
            rows,
            cols: 1,
            data,
        }
    }

    pub fn row_vector(data: Vec<T>) -> Self {
        let cols = data.len();
        Matrix {
            rows: 1,
            cols,
            data,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entries in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn try_map<U>(&self, f: impl FnMut(&T) -> Result<U>) -> Result<Matrix<U>> {
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect::<Result<Vec<U>>>()?,
        })
    }
}

impl<T: Clone> Matrix<T> {
    pub fn transpose(&self) -> Self {
        Matrix::from_fn(self.cols, self.rows, |i, j| self[(j, i)].clone())
    }
}

impl<F: Float> Matrix<F> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::from_fn(rows, cols, |_, _| F::zero())
    }

    pub fn identity(n: usize) -> Self {
        Matrix::from_fn(n, n, |i, j| if i == j { F::one() } else { F::zero() })
    }
}

impl<S: Scalar> Matrix<S> {
    /// Lift a plain matrix to constants of this scalar kind.
    pub fn constant(m: &Matrix<S::Float>) -> Self {
        m.map(|&v| S::from_f(v))
    }

    /// Primal values.
    pub fn values(&self) -> Matrix<S::Float> {
        self.map(Scalar::value)
    }

    /// Matrix product `self · rhs`.
    pub fn multiply(&self, rhs: &Matrix<S>) -> Result<Matrix<S>> {
        if self.cols != rhs.rows {
            return Err(AdError::SizeMismatch {
                op: "multiply",
                lhs_name: "columns of A",
                lhs: self.cols,
                rhs_name: "rows of B",
                rhs: rhs.rows,
            });
        }
        Ok(Matrix::from_fn(self.rows, rhs.cols, |i, j| {
            (0..self.cols).fold(S::zero(), |acc, k| acc + self[(i, k)] * rhs[(k, j)])
        }))
    }

    /// Sum of squared entries, `Σ mᵢⱼ²`.
    pub fn dot_self(&self) -> S {
        self.data.iter().fold(S::zero(), |acc, &x| acc + x * x)
    }

    pub fn sum(&self) -> S {
        self.data.iter().fold(S::zero(), |acc, &x| acc + x)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(i < self.rows && j < self.cols);
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(i < self.rows && j < self.cols);
        &mut self.data[i * self.cols + j]
    }
}

/// Apply a scalar primitive to every entry. Each entry becomes its own node.
pub fn elementwise<S: Scalar>(op: &dyn Elementary<S::Float>, m: &Matrix<S>) -> Result<Matrix<S>> {
    m.try_map(|&x| S::apply(op, &[x]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t[(2, 0)], 3.0);
    }

    #[test]
    fn multiply_checks_inner_dimension() {
        let a = Matrix::<f64>::zeros(2, 3);
        let b = Matrix::<f64>::zeros(2, 3);
        let err = a.multiply(&b).unwrap_err();
        assert_eq!(
            err.to_string(),
            "multiply: columns of A (3) does not match rows of B (2)"
        );
    }

    #[test]
    fn multiply_by_identity() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let p = a.multiply(&Matrix::identity(2)).unwrap();
        assert_eq!(p, a);
    }

    #[test]
    fn reductions() {
        let v = Matrix::column_vector(vec![1.0, -2.0, 3.0]);
        assert_eq!(v.dot_self(), 14.0);
        assert_eq!(v.sum(), 2.0);
    }
}
