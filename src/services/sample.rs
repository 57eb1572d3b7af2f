use crate::error::Result;
use crate::float::Float;

/// One state of a Markov chain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample<F> {
    /// Unconstrained parameter values.
    pub params: Vec<F>,
    /// Log density at `params`.
    pub log_prob: F,
    /// Acceptance statistic of the transition that produced this state.
    pub accept_stat: F,
}

impl<F: Float> Sample<F> {
    pub fn new(params: Vec<F>, log_prob: F, accept_stat: F) -> Self {
        Sample {
            params,
            log_prob,
            accept_stat,
        }
    }

    /// Initial state: no transition has been accepted yet.
    pub fn initial(params: Vec<F>, log_prob: F) -> Self {
        Sample::new(params, log_prob, F::zero())
    }

    pub fn dim(&self) -> usize {
        self.params.len()
    }
}

/// A transition kernel.
///
/// Samplers usually hold a [`GradientEvaluator`](crate::GradientEvaluator)
/// and treat a domain error from it as a rejected proposal; only errors the
/// sampler cannot absorb, such as arena exhaustion, should be returned.
pub trait Sampler<F: Float> {
    /// Move the chain one step from `current`.
    fn transition(&mut self, current: &Sample<F>) -> Result<Sample<F>>;

    /// Names of the sampler's own per-iteration parameters (step size, ...).
    fn sampler_param_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Values of the sampler's own parameters, aligned with
    /// [`sampler_param_names`](Sampler::sampler_param_names).
    fn sampler_params(&self) -> Vec<F> {
        Vec::new()
    }

    /// Whether [`gradient`](Sampler::gradient) reports anything.
    fn reports_gradient(&self) -> bool {
        false
    }

    /// Gradient of the log density at the last state, if computed.
    fn gradient(&self) -> Option<Vec<F>> {
        None
    }
}
