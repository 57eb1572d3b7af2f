//! Independent gradient evaluations across threads.
//!
//! Every rayon worker records into its own arena; no node storage is shared.

use rayon::prelude::*;

use crate::api::value_and_grad_in;
use crate::arena::{Arena, ArenaThreadLocal};
use crate::error::Result;
use crate::evaluator::LogDensity;
use crate::var::Var;

/// Log density and gradient at each point, evaluated in parallel.
///
/// Results are in the order of `points`; a failing point does not affect the
/// others.
pub fn evaluate_batch<F, M>(model: &M, points: &[Vec<F>]) -> Vec<Result<(F, Vec<F>)>>
where
    F: ArenaThreadLocal,
    M: LogDensity<F> + Sync,
{
    let n = model.dim();
    points
        .par_iter()
        .map_init(
            || Arena::with_capacity(n * 10),
            |arena, x| {
                assert_eq!(x.len(), n, "parameter count must match model dimension");
                value_and_grad_in(arena, |v| model.log_density(v), x)
            },
        )
        .collect()
}

/// Gradients of an arbitrary closure at each point, one arena per worker.
pub fn grad_batch<F, G>(f: G, points: &[Vec<F>]) -> Vec<Result<Vec<F>>>
where
    F: ArenaThreadLocal,
    G: Fn(&[Var<F>]) -> Result<Var<F>> + Sync,
{
    points
        .par_iter()
        .map_init(Arena::new, |arena, x| {
            value_and_grad_in(arena, &f, x).map(|(_, g)| g)
        })
        .collect()
}
