//! The objective boundary: `parameters -> (log density, gradient)`.

use tracing::{debug, trace};

use crate::api::value_and_grad_in;
use crate::arena::{Arena, ArenaThreadLocal};
use crate::dual::Dual;
use crate::error::Result;
use crate::float::Float;
use crate::scalar::Scalar;

/// A log density over unconstrained parameters.
///
/// The density is written once against [`Scalar`] and evaluated with plain
/// floats, dual numbers or tape variables as needed.
pub trait LogDensity<F: Float> {
    /// Number of unconstrained parameters.
    fn dim(&self) -> usize;

    /// Log density at `params`. Domain violations in any primitive are
    /// returned, not corrected.
    fn log_density<S: Scalar<Float = F>>(&self, params: &[S]) -> Result<S>;
}

impl<F: Float, M: LogDensity<F>> LogDensity<F> for &M {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn log_density<S: Scalar<Float = F>>(&self, params: &[S]) -> Result<S> {
        (**self).log_density(params)
    }
}

/// Reverse-mode gradient evaluator owning one arena.
///
/// Each call to [`evaluate`](GradientEvaluator::evaluate) is one epoch: the
/// arena is reset, parameters are seeded as nodes `0..n`, the density is
/// recorded and swept backwards. Evaluators are independent; give each chain
/// its own.
pub struct GradientEvaluator<F: ArenaThreadLocal, M> {
    model: M,
    arena: Arena<F>,
    evals: usize,
    rejected: usize,
}

impl<F, M> GradientEvaluator<F, M>
where
    F: ArenaThreadLocal + Scalar<Float = F>,
    M: LogDensity<F>,
{
    pub fn new(model: M) -> Self {
        let capacity = model.dim() * 10;
        Self::with_arena(model, Arena::with_capacity(capacity))
    }

    /// Use a preconfigured arena, e.g. one built with [`Arena::with_limit`].
    pub fn with_arena(model: M, arena: Arena<F>) -> Self {
        GradientEvaluator {
            model,
            arena,
            evals: 0,
            rejected: 0,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn dim(&self) -> usize {
        self.model.dim()
    }

    /// The arena as left by the last evaluation.
    pub fn arena(&self) -> &Arena<F> {
        &self.arena
    }

    /// Number of gradient evaluations attempted so far.
    pub fn evals(&self) -> usize {
        self.evals
    }

    /// Number of evaluations that returned an error.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Log density and its gradient at `params`.
    ///
    /// # Panics
    ///
    /// Panics if `params.len()` differs from the model dimension.
    pub fn evaluate(&mut self, params: &[F]) -> Result<(F, Vec<F>)> {
        assert_eq!(
            params.len(),
            self.model.dim(),
            "parameter count must match model dimension"
        );
        self.evals += 1;
        let model = &self.model;
        match value_and_grad_in(&mut self.arena, |x| model.log_density(x), params) {
            Ok((value, gradient)) => {
                trace!(
                    nodes = self.arena.node_count(),
                    epoch = self.arena.epoch(),
                    "reverse sweep complete"
                );
                Ok((value, gradient))
            }
            Err(e) => {
                self.rejected += 1;
                debug!(error = %e, eval = self.evals, "evaluation rejected");
                Err(e)
            }
        }
    }

    /// Log density alone, evaluated on plain floats.
    pub fn log_density(&self, params: &[F]) -> Result<F> {
        self.model.log_density(params)
    }

    /// Log density and its derivative along `direction`, in forward mode.
    pub fn directional_derivative(&self, params: &[F], direction: &[F]) -> Result<(F, F)> {
        assert_eq!(
            params.len(),
            direction.len(),
            "params and direction must have the same length"
        );
        let inputs: Vec<Dual<F>> = params
            .iter()
            .zip(direction)
            .map(|(&x, &v)| Dual::new(x, v))
            .collect();
        let y = self.model.log_density(&inputs)?;
        Ok((y.value, y.tangent))
    }
}
