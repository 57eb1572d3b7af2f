use crate::arena::{Arena, ArenaGuard, ArenaThreadLocal};
use crate::dual::Dual;
use crate::error::{AdError, Result};
use crate::float::Float;
use crate::var::Var;

/// Seed `x` into a fresh epoch of `arena`, run `f` with the arena active and
/// return its output. Nothing is swept.
pub(crate) fn record_epoch<F: ArenaThreadLocal, R>(
    arena: &mut Arena<F>,
    f: impl FnOnce(&[Var<F>]) -> Result<R>,
    x: &[F],
) -> Result<R> {
    arena.reset();
    let inputs = x
        .iter()
        .map(|&val| arena.new_variable(val))
        .collect::<Result<Vec<_>>>()?;

    let output = {
        let _guard = ArenaGuard::new(arena);
        f(&inputs)
    };

    // An exhausted arena may have handed out untracked values; the result is
    // unusable whatever `f` returned.
    if arena.is_exhausted() {
        return Err(AdError::ArenaExhausted {
            capacity: arena.limit().unwrap_or(arena.node_count()),
        });
    }
    output
}

/// Value and gradient of `f : Rⁿ → R` using reverse mode, recorded in `arena`.
pub fn value_and_grad_in<F: ArenaThreadLocal>(
    arena: &mut Arena<F>,
    f: impl FnOnce(&[Var<F>]) -> Result<Var<F>>,
    x: &[F],
) -> Result<(F, Vec<F>)> {
    let output = record_epoch(arena, f, x)?;
    let adjoints = arena.reverse(output);
    let n = x.len();
    Ok((output.value(), adjoints[..n].to_vec()))
}

/// Value and gradient of `f : Rⁿ → R` using reverse mode on a fresh arena.
pub fn value_and_grad<F: ArenaThreadLocal>(
    f: impl FnOnce(&[Var<F>]) -> Result<Var<F>>,
    x: &[F],
) -> Result<(F, Vec<F>)> {
    let mut arena = Arena::with_capacity(x.len() * 10);
    value_and_grad_in(&mut arena, f, x)
}

/// Gradient of a scalar function `f : Rⁿ → R` using reverse mode.
///
/// ```
/// let g = adcore::grad(|x: &[adcore::Var<f64>]| {
///     Ok(x[0] * x[0] + x[1] * x[1])
/// }, &[3.0, 4.0]).unwrap();
/// assert!((g[0] - 6.0).abs() < 1e-10);
/// assert!((g[1] - 8.0).abs() < 1e-10);
/// ```
pub fn grad<F: ArenaThreadLocal>(
    f: impl FnOnce(&[Var<F>]) -> Result<Var<F>>,
    x: &[F],
) -> Result<Vec<F>> {
    value_and_grad(f, x).map(|(_, g)| g)
}

/// Vector-Jacobian product (reverse mode): `(f(x), wᵀ·J)`.
pub fn vjp<F: ArenaThreadLocal>(
    f: impl FnOnce(&[Var<F>]) -> Result<Vec<Var<F>>>,
    x: &[F],
    w: &[F],
) -> Result<(Vec<F>, Vec<F>)> {
    let mut arena = Arena::with_capacity(x.len() * 10);
    let outputs = record_epoch(&mut arena, f, x)?;
    assert_eq!(
        outputs.len(),
        w.len(),
        "output length must match weight vector length"
    );

    let values: Vec<F> = outputs.iter().map(|r| r.value()).collect();
    let seeds: Vec<(Var<F>, F)> = outputs.iter().copied().zip(w.iter().copied()).collect();
    let adjoints = arena.reverse_seeded(&seeds);
    Ok((values, adjoints[..x.len()].to_vec()))
}

/// Jacobian-vector product (forward mode): `(f(x), J·v)`.
pub fn jvp<F: Float>(
    f: impl FnOnce(&[Dual<F>]) -> Result<Vec<Dual<F>>>,
    x: &[F],
    v: &[F],
) -> Result<(Vec<F>, Vec<F>)> {
    assert_eq!(x.len(), v.len(), "x and v must have the same length");
    let inputs: Vec<Dual<F>> = x
        .iter()
        .zip(v.iter())
        .map(|(&xi, &vi)| Dual::new(xi, vi))
        .collect();
    let outputs = f(&inputs)?;
    let values = outputs.iter().map(|d| d.value).collect();
    let tangents = outputs.iter().map(|d| d.tangent).collect();
    Ok((values, tangents))
}

/// Derivative of a scalar function of one variable (forward mode).
pub fn derivative<F: Float>(f: impl FnOnce(Dual<F>) -> Result<Dual<F>>, x: F) -> Result<(F, F)> {
    let y = f(Dual::variable(x))?;
    Ok((y.value, y.tangent))
}

/// Full Jacobian of `f : Rⁿ → Rᵐ` using forward mode, one pass per input.
///
/// Returns `(f(x), J)` where `J[i][j] = ∂f_i/∂x_j`.
pub fn jacobian<F: Float>(
    f: impl Fn(&[Dual<F>]) -> Result<Vec<Dual<F>>>,
    x: &[F],
) -> Result<(Vec<F>, Vec<Vec<F>>)> {
    let n = x.len();

    let const_inputs: Vec<Dual<F>> = x.iter().map(|&xi| Dual::constant(xi)).collect();
    let const_outputs = f(&const_inputs)?;
    let m = const_outputs.len();
    let values: Vec<F> = const_outputs.iter().map(|d| d.value).collect();

    let mut jac = vec![vec![F::zero(); n]; m];
    for j in 0..n {
        let inputs: Vec<Dual<F>> = x
            .iter()
            .enumerate()
            .map(|(k, &xi)| {
                if k == j {
                    Dual::variable(xi)
                } else {
                    Dual::constant(xi)
                }
            })
            .collect();
        let outputs = f(&inputs)?;
        for (row, out) in jac.iter_mut().zip(outputs.iter()) {
            row[j] = out.tangent;
        }
    }

    Ok((values, jac))
}
