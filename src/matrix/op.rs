use super::Matrix;
use crate::arena::{self, Arena, ArenaThreadLocal, OpKind};
use crate::dual::Dual;
use crate::error::Result;
use crate::float::Float;
use crate::var::Var;

/// A joint matrix operation: every output entry may depend on every input entry.
///
/// The matrix counterpart of [`Elementary`](crate::elementary::Elementary):
/// the primal value plus, per output entry, a dense block of partials with
/// respect to the whole input.
pub trait MatrixOp<F: Float> {
    fn name(&self) -> &'static str;

    /// Primal result. Shape and structural preconditions are checked here.
    fn compute_value(&self, input: &Matrix<F>) -> Result<Matrix<F>>;

    /// Write `∂output[entry] / ∂input[i, j]` into `block[i * input.cols() + j]`.
    fn compute_partials(
        &self,
        input: &Matrix<F>,
        output: &Matrix<F>,
        entry: (usize, usize),
        block: &mut [F],
    );
}

pub fn eval<F: Float>(op: &dyn MatrixOp<F>, input: &Matrix<F>) -> Result<Matrix<F>> {
    op.compute_value(input)
}

/// Forward mode: each output tangent is its partial block dotted with the input tangents.
pub fn forward<F: Float>(op: &dyn MatrixOp<F>, input: &Matrix<Dual<F>>) -> Result<Matrix<Dual<F>>> {
    let values = input.map(|d| d.value);
    let output = op.compute_value(&values)?;
    let mut block = vec![F::zero(); input.len()];
    Ok(Matrix::from_fn(output.rows(), output.cols(), |k, l| {
        op.compute_partials(&values, &output, (k, l), &mut block);
        let tangent = block
            .iter()
            .zip(input.iter())
            .fold(F::zero(), |acc, (&p, d)| acc + p * d.tangent);
        Dual::new(output[(k, l)], tangent)
    }))
}

/// Reverse mode: one node per output entry, each with the whole input as operands.
pub fn record_in<F: Float>(
    arena: &mut Arena<F>,
    op: &dyn MatrixOp<F>,
    input: &Matrix<Var<F>>,
) -> Result<Matrix<Var<F>>> {
    let values = input.map(|v| v.value);
    let output = op.compute_value(&values)?;
    let operands = input.as_slice();
    let mut block = vec![F::zero(); input.len()];
    Ok(Matrix::from_fn(output.rows(), output.cols(), |k, l| {
        op.compute_partials(&values, &output, (k, l), &mut block);
        arena.push_nary(OpKind::Primitive(op.name()), operands, &block, output[(k, l)])
    }))
}

pub fn record<F: ArenaThreadLocal>(
    op: &dyn MatrixOp<F>,
    input: &Matrix<Var<F>>,
) -> Result<Matrix<Var<F>>> {
    arena::with_active_arena(|a| record_in(a, op, input))
}
