use tracing::trace;

use super::callbacks::{Interrupt, IterationCallback, LogIteration};
use super::sample::{Sample, Sampler};
use super::writer::{McmcWriter, Writer};
use crate::error::Result;
use crate::float::Float;

/// Configuration for one call of [`generate_transitions`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionConfig {
    /// Number of transitions to run.
    pub num_iterations: usize,
    /// Iterations already run before this call; the first iteration reported
    /// is `start + 1`.
    pub start: usize,
    /// Last iteration number of the whole run, for progress messages.
    pub finish: usize,
    /// Keep every `num_thin`-th state.
    pub num_thin: usize,
    /// Progress cadence of the default callback; 0 disables it.
    pub refresh: usize,
    /// Write kept states to the writers.
    pub save: bool,
    /// Label progress as warmup.
    pub warmup: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        TransitionConfig {
            num_iterations: 0,
            start: 0,
            finish: 0,
            num_thin: 1,
            refresh: 100,
            save: true,
            warmup: false,
        }
    }
}

impl TransitionConfig {
    /// `num_iterations` sampling iterations numbered from 1.
    pub fn sampling(num_iterations: usize) -> Self {
        TransitionConfig {
            num_iterations,
            finish: num_iterations,
            ..Default::default()
        }
    }

    /// Whether the state after 0-indexed iteration `m` is written.
    pub fn keeps(&self, m: usize) -> bool {
        self.save && m % self.num_thin == 0
    }

    /// The default progress callback for this configuration.
    pub fn log_iteration(&self) -> LogIteration {
        let num_warmup = if self.warmup { self.finish } else { self.start };
        LogIteration::new(self.start, num_warmup, self.finish, self.refresh)
    }
}

/// Run `config.num_iterations` transitions starting from `state`.
///
/// Every iteration calls the interrupt, then the iteration callback with the
/// 1-indexed number `start + m + 1`, then the sampler. The new state is
/// written to both streams when `save` is set and `m % num_thin == 0`, with
/// `m` counted from 0 within this call.
///
/// On return `state` holds the last state reached; on error, the last state
/// before the failing transition.
///
/// # Panics
///
/// Panics if `num_thin` is 0 while `save` is set.
pub fn generate_transitions<F, S, W, D>(
    sampler: &mut S,
    config: &TransitionConfig,
    writer: &mut McmcWriter<W, D>,
    state: &mut Sample<F>,
    interrupt: &mut impl Interrupt,
    iteration: &mut impl IterationCallback,
) -> Result<()>
where
    F: Float,
    S: Sampler<F>,
    W: Writer<F>,
    D: Writer<F>,
{
    assert!(
        !config.save || config.num_thin > 0,
        "num_thin must be positive when saving"
    );
    for m in 0..config.num_iterations {
        interrupt.interrupt();
        iteration.iteration(config.start + m + 1);

        *state = sampler.transition(state)?;

        if config.keeps(m) {
            trace!(iteration = config.start + m + 1, "writing sample");
            writer.write_sample_params(state, sampler)?;
            writer.write_diagnostic_params(state, sampler)?;
        }
    }
    Ok(())
}

/// [`generate_transitions`] with progress reported by [`LogIteration`].
pub fn generate_transitions_logged<F, S, W, D>(
    sampler: &mut S,
    config: &TransitionConfig,
    writer: &mut McmcWriter<W, D>,
    state: &mut Sample<F>,
    interrupt: &mut impl Interrupt,
) -> Result<()>
where
    F: Float,
    S: Sampler<F>,
    W: Writer<F>,
    D: Writer<F>,
{
    let mut iteration = config.log_iteration();
    generate_transitions(sampler, config, writer, state, interrupt, &mut iteration)
}
