//! The contract every primitive implements to take part in both AD modes.
//!
//! A primitive supplies its primal value and its local partial derivatives.
//! Nothing else: the same two methods drive plain evaluation, forward-mode
//! tangent propagation and tape recording, so new primitives never touch the
//! arena or the evaluator.
//!
//! ```
//! use adcore::elementary::Elementary;
//! use adcore::{AdError, Float, Scalar};
//!
//! /// softplus(x) = ln(1 + eˣ)
//! struct Softplus;
//!
//! impl<F: Float> Elementary<F> for Softplus {
//!     fn name(&self) -> &'static str { "softplus" }
//!     fn arity(&self) -> usize { 1 }
//!     fn compute_value(&self, args: &[F]) -> Result<F, AdError> {
//!         Ok(args[0].exp().ln_1p())
//!     }
//!     fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
//!         partials[0] = F::one() / (F::one() + (-args[0]).exp());
//!     }
//! }
//!
//! let g = adcore::grad(|x| adcore::Var::apply(&Softplus, &[x[0]]), &[0.0_f64]).unwrap();
//! assert!((g[0] - 0.5).abs() < 1e-12);
//! ```

use crate::arena::{self, Arena, ArenaThreadLocal, OpKind};
use crate::dual::Dual;
use crate::error::Result;
use crate::float::Float;
use crate::var::Var;

/// A primitive `f(x₁, …, xₖ) → y`.
pub trait Elementary<F: Float> {
    /// Operation name, used on the tape and in error messages.
    fn name(&self) -> &'static str;

    /// Number of operands `k`.
    fn arity(&self) -> usize;

    /// Primal value at `args`.
    ///
    /// Domain violations are reported here, so a failing primitive never
    /// records a node.
    fn compute_value(&self, args: &[F]) -> Result<F>;

    /// Write `∂f/∂xᵢ` evaluated at `args` into `partials[i]`.
    ///
    /// Only called after [`compute_value`](Elementary::compute_value) succeeded,
    /// with that call's result as `value`.
    fn compute_partials(&self, args: &[F], value: F, partials: &mut [F]);
}

fn check_arity<F: Float>(op: &dyn Elementary<F>, got: usize) {
    assert_eq!(
        op.arity(),
        got,
        "{}: expected {} operands, got {got}",
        op.name(),
        op.arity()
    );
}

/// Evaluate `op` on plain values.
pub fn eval<F: Float>(op: &dyn Elementary<F>, args: &[F]) -> Result<F> {
    check_arity(op, args.len());
    op.compute_value(args)
}

/// Evaluate `op` on duals: `tangent = Σᵢ ∂f/∂xᵢ · tangentᵢ`.
pub fn forward<F: Float>(op: &dyn Elementary<F>, args: &[Dual<F>]) -> Result<Dual<F>> {
    check_arity(op, args.len());
    let values: Vec<F> = args.iter().map(|d| d.value).collect();
    let value = op.compute_value(&values)?;
    let mut partials = vec![F::zero(); args.len()];
    op.compute_partials(&values, value, &mut partials);
    let tangent = partials
        .iter()
        .zip(args)
        .fold(F::zero(), |acc, (&p, d)| acc + p * d.tangent);
    Ok(Dual::new(value, tangent))
}

/// Evaluate `op` on variables and record one node in `arena`.
pub fn record_in<F: Float>(
    arena: &mut Arena<F>,
    op: &dyn Elementary<F>,
    args: &[Var<F>],
) -> Result<Var<F>> {
    check_arity(op, args.len());
    let values: Vec<F> = args.iter().map(|v| v.value).collect();
    let value = op.compute_value(&values)?;
    let mut partials = vec![F::zero(); args.len()];
    op.compute_partials(&values, value, &mut partials);
    Ok(arena.push_nary(OpKind::Primitive(op.name()), args, &partials, value))
}

/// Evaluate `op` on variables and record one node in the active arena.
pub fn record<F: ArenaThreadLocal>(op: &dyn Elementary<F>, args: &[Var<F>]) -> Result<Var<F>> {
    arena::with_active_arena(|a| record_in(a, op, args))
}
