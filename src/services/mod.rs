//! Transition generation: drives a [`Sampler`] for a fixed number of
//! iterations, reporting progress and writing kept states.
//!
//! The sampler is where the [`GradientEvaluator`](crate::GradientEvaluator)
//! is consumed; this loop only sequences calls.

mod callbacks;
mod sample;
mod transitions;
mod writer;

pub use callbacks::{Interrupt, IterationCallback, LogIteration};
pub use sample::{Sample, Sampler};
pub use transitions::{generate_transitions, generate_transitions_logged, TransitionConfig};
pub use writer::{McmcWriter, MemoryWriter, NullWriter, Writer};
