use std::fmt::{self, Display};

use crate::arena::CONSTANT;
use crate::Float;

/// Reverse-mode AD variable.
///
/// A value, a node index and the arena epoch the node belongs to. `Copy`
/// because the node lives in the arena, not inside this struct: copying a
/// variable copies the handle, never the node.
#[derive(Clone, Copy, Debug)]
pub struct Var<F: Float> {
    pub(crate) value: F,
    pub(crate) index: u32,
    pub(crate) epoch: u32,
}

impl<F: Float> Var<F> {
    /// Create a constant (not tracked on the tape).
    #[inline]
    pub fn constant(value: F) -> Self {
        Var {
            value,
            index: CONSTANT,
            epoch: 0,
        }
    }

    /// Wrap a node allocated in an arena during `epoch`.
    #[inline]
    pub fn from_arena(value: F, index: u32, epoch: u32) -> Self {
        Var {
            value,
            index,
            epoch,
        }
    }

    /// Primal value.
    #[inline]
    pub fn value(&self) -> F {
        self.value
    }

    /// Node index, or [`CONSTANT`] for untracked values.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Epoch of the arena the node was recorded in.
    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.index == CONSTANT
    }
}

impl<F: Float> Display for Var<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<F: Float> Default for Var<F> {
    fn default() -> Self {
        Var::constant(F::zero())
    }
}
