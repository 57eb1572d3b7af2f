//! Bulk-allocated tape for reverse-mode AD.
//!
//! One [`Arena`] holds every node recorded during a single evaluation epoch.
//! Nodes are appended in creation order and each node's operands have strictly
//! smaller indices, so walking the nodes backwards is already a valid reverse
//! topological order. Nodes are never freed individually: [`Arena::reset`]
//! drops the whole epoch at once and keeps the allocations for the next one.
//!
//! Operand indices and partials live in two flat stacks shared by all nodes;
//! a node only stores where its span ends, so the reverse sweep is a single
//! multiply-accumulate loop with no per-operation dispatch.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

use tracing::warn;

use crate::error::{AdError, Result};
use crate::float::Float;
use crate::var::Var;

/// Sentinel index for constants (not recorded on the tape).
pub const CONSTANT: u32 = u32::MAX;

/// What produced a node. Carried for diagnostics only; the sweep never
/// branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    /// Independent variable seeded by the evaluator.
    Input,
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Rem,
    /// Mixed operation with a plain float (`x + c`, `c * x`, ...).
    Affine,
    /// A catalog primitive or one entry of a matrix operation.
    Primitive(&'static str),
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Primitive(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Node<F> {
    kind: OpKind,
    value: F,
    /// Operands of node `i` span `[nodes[i-1].end_plus_one .. end_plus_one)`.
    end_plus_one: u32,
}

/// Read-only view of one recorded node.
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a, F> {
    pub kind: OpKind,
    pub value: F,
    pub adjoint: F,
    pub operands: &'a [u32],
    pub partials: &'a [F],
}

/// Node storage for one evaluation epoch.
pub struct Arena<F: Float> {
    nodes: Vec<Node<F>>,
    operands: Vec<u32>,
    partials: Vec<F>,
    adjoints: Vec<F>,
    epoch: u32,
    limit: Option<usize>,
    exhausted: bool,
}

impl<F: Float> Default for Arena<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> fmt::Debug for Arena<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("nodes", &self.nodes.len())
            .field("operands", &self.operands.len())
            .field("epoch", &self.epoch)
            .field("limit", &self.limit)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl<F: Float> Arena<F> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Arena {
            nodes: Vec::new(),
            operands: Vec::new(),
            partials: Vec::new(),
            adjoints: Vec::new(),
            epoch: 0,
            limit: None,
            exhausted: false,
        }
    }

    /// Create an arena with room for roughly `est_ops` nodes.
    pub fn with_capacity(est_ops: usize) -> Self {
        Arena {
            nodes: Vec::with_capacity(est_ops),
            operands: Vec::with_capacity(est_ops * 2),
            partials: Vec::with_capacity(est_ops * 2),
            adjoints: Vec::new(),
            epoch: 0,
            limit: None,
            exhausted: false,
        }
    }

    /// Create an arena that refuses to hold more than `max_nodes` nodes per epoch.
    pub fn with_limit(max_nodes: usize) -> Self {
        let mut arena = Self::new();
        arena.limit = Some(max_nodes);
        arena
    }

    /// Number of nodes recorded in the current epoch.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current epoch. Incremented by every [`reset`](Arena::reset).
    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Node limit, if one was configured.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether a recording in this epoch was refused for lack of space.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Discard every node of the current epoch. Capacity is kept.
    ///
    /// Variables created before the reset must not be used afterwards; debug
    /// builds panic if one reaches the arena.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.operands.clear();
        self.partials.clear();
        self.adjoints.clear();
        self.epoch = self.epoch.wrapping_add(1);
        self.exhausted = false;
    }

    /// Append a node and return its index.
    ///
    /// Operands equal to [`CONSTANT`] are dropped together with their partial.
    /// Fails only when the node limit is reached or memory cannot be reserved.
    pub fn allocate_node(
        &mut self,
        kind: OpKind,
        operands: &[u32],
        partials: &[F],
        value: F,
    ) -> Result<u32> {
        assert_eq!(
            operands.len(),
            partials.len(),
            "{kind}: operand and partial counts differ"
        );
        let index = self.nodes.len();
        if self.limit.is_some_and(|max| index >= max) || index >= CONSTANT as usize {
            return Err(self.exhaust());
        }
        if self.nodes.try_reserve(1).is_err()
            || self.operands.try_reserve(operands.len()).is_err()
            || self.partials.try_reserve(partials.len()).is_err()
        {
            return Err(self.exhaust());
        }

        for (&operand, &partial) in operands.iter().zip(partials) {
            if operand == CONSTANT {
                continue;
            }
            debug_assert!(
                (operand as usize) < index,
                "{kind}: operand {operand} is not older than node {index}"
            );
            self.operands.push(operand);
            self.partials.push(partial);
        }
        self.nodes.push(Node {
            kind,
            value,
            end_plus_one: self.operands.len() as u32,
        });
        Ok(index as u32)
    }

    fn exhaust(&mut self) -> AdError {
        let capacity = self.limit.unwrap_or(self.nodes.len());
        if !self.exhausted {
            warn!(capacity, epoch = self.epoch, "arena exhausted");
        }
        self.exhausted = true;
        AdError::ArenaExhausted { capacity }
    }

    /// Register an independent variable.
    pub fn new_variable(&mut self, value: F) -> Result<Var<F>> {
        let index = self.allocate_node(OpKind::Input, &[], &[], value)?;
        Ok(Var::from_arena(value, index, self.epoch))
    }

    /// Record a unary operation `value = f(x)` with `partial = df/dx`.
    #[inline]
    pub fn push_unary(&mut self, kind: OpKind, x: Var<F>, partial: F, value: F) -> Var<F> {
        self.check_live(x);
        self.record(kind, &[x.index], &[partial], value)
    }

    /// Record a binary operation with its two partials.
    #[inline]
    pub fn push_binary(
        &mut self,
        kind: OpKind,
        lhs: Var<F>,
        lhs_partial: F,
        rhs: Var<F>,
        rhs_partial: F,
        value: F,
    ) -> Var<F> {
        self.check_live(lhs);
        self.check_live(rhs);
        self.record(kind, &[lhs.index, rhs.index], &[lhs_partial, rhs_partial], value)
    }

    /// Record an operation over any number of operands.
    pub fn push_nary(&mut self, kind: OpKind, args: &[Var<F>], partials: &[F], value: F) -> Var<F> {
        let indices: Vec<u32> = args
            .iter()
            .map(|&arg| {
                self.check_live(arg);
                arg.index
            })
            .collect();
        self.record(kind, &indices, partials, value)
    }

    /// Operator overloads cannot return errors, so a refused allocation marks
    /// the epoch exhausted and yields an untracked value; the evaluator checks
    /// the flag before any sweep.
    fn record(&mut self, kind: OpKind, operands: &[u32], partials: &[F], value: F) -> Var<F> {
        if operands.iter().all(|&i| i == CONSTANT) {
            return Var::constant(value);
        }
        match self.allocate_node(kind, operands, partials, value) {
            Ok(index) => Var::from_arena(value, index, self.epoch),
            Err(_) => Var::constant(value),
        }
    }

    #[inline]
    fn check_live(&self, var: Var<F>) {
        if var.index == CONSTANT {
            return;
        }
        debug_assert!(
            var.epoch == self.epoch && (var.index as usize) < self.nodes.len(),
            "stale variable: node {} from epoch {} used in epoch {}",
            var.index,
            var.epoch,
            self.epoch
        );
    }

    /// Primal value stored at `var`'s node.
    pub fn value(&self, var: Var<F>) -> F {
        if var.index == CONSTANT {
            return var.value;
        }
        self.check_live(var);
        self.nodes[var.index as usize].value
    }

    /// Adjoint of `var` after the most recent sweep (zero if none ran).
    pub fn adjoint(&self, var: Var<F>) -> F {
        if var.index == CONSTANT {
            return F::zero();
        }
        self.check_live(var);
        self.adjoints
            .get(var.index as usize)
            .copied()
            .unwrap_or_else(F::zero)
    }

    /// Inspect node `index`.
    pub fn node(&self, index: u32) -> NodeView<'_, F> {
        let i = index as usize;
        let start = if i == 0 {
            0
        } else {
            self.nodes[i - 1].end_plus_one as usize
        };
        let node = &self.nodes[i];
        let end = node.end_plus_one as usize;
        NodeView {
            kind: node.kind,
            value: node.value,
            adjoint: self.adjoints.get(i).copied().unwrap_or_else(F::zero),
            operands: &self.operands[start..end],
            partials: &self.partials[start..end],
        }
    }

    /// Reverse sweep seeding the adjoint of `output` with one.
    pub fn reverse(&mut self, output: Var<F>) -> &[F] {
        self.reverse_seeded(&[(output, F::one())])
    }

    /// Reverse sweep with custom adjoint seeds. Returns one adjoint per node.
    ///
    /// Nodes are visited in strictly decreasing index order, so each node has
    /// received every contribution from later nodes before it propagates.
    pub fn reverse_seeded(&mut self, seeds: &[(Var<F>, F)]) -> &[F] {
        let n = self.nodes.len();
        self.adjoints.clear();
        self.adjoints.resize(n, F::zero());
        for &(var, seed) in seeds {
            if var.index == CONSTANT {
                continue;
            }
            self.check_live(var);
            let slot = &mut self.adjoints[var.index as usize];
            *slot = *slot + seed;
        }

        for i in (0..n).rev() {
            let a = self.adjoints[i];
            if a == F::zero() {
                continue;
            }
            let start = if i == 0 {
                0
            } else {
                self.nodes[i - 1].end_plus_one as usize
            };
            let end = self.nodes[i].end_plus_one as usize;
            for j in start..end {
                let k = self.operands[j] as usize;
                self.adjoints[k] = self.adjoints[k] + self.partials[j] * a;
            }
        }
        &self.adjoints
    }

    /// Adjoints from the most recent sweep.
    pub fn adjoints(&self) -> &[F] {
        &self.adjoints
    }
}

// Thread-local active arena pointer.
thread_local! {
    static ARENA_F32: Cell<*mut Arena<f32>> = const { Cell::new(std::ptr::null_mut()) };
    static ARENA_F64: Cell<*mut Arena<f64>> = const { Cell::new(std::ptr::null_mut()) };
}

/// Selects the thread-local slot for a given float type.
pub trait ArenaThreadLocal: Float {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Arena<Self>>>;
}

impl ArenaThreadLocal for f32 {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Arena<Self>>> {
        &ARENA_F32
    }
}

impl ArenaThreadLocal for f64 {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Arena<Self>>> {
        &ARENA_F64
    }
}

/// Access the arena activated on this thread. Panics if none is active.
#[inline]
pub fn with_active_arena<F: ArenaThreadLocal, R>(f: impl FnOnce(&mut Arena<F>) -> R) -> R {
    F::cell().with(|cell| {
        let ptr = cell.get();
        assert!(
            !ptr.is_null(),
            "No active arena. Use adcore::grad(), a GradientEvaluator, or an ArenaGuard."
        );
        // SAFETY: the pointer was installed by an ArenaGuard that still holds
        // the arena's unique borrow, and the thread-local gives exclusive
        // single-threaded access.
        let arena = unsafe { &mut *ptr };
        f(arena)
    })
}

/// RAII guard that makes `arena` the active arena of this thread for the
/// guard's scope, restoring the previous one on drop.
///
/// The guard holds the arena's unique borrow, so the arena cannot be reset,
/// read or dropped until the guard is gone:
///
/// ```
/// use adcore::{Arena, ArenaGuard, Var};
///
/// let mut arena = Arena::<f64>::new();
/// {
///     let _guard = ArenaGuard::new(&mut arena);
///     let x = Var::<f64>::constant(2.0);
///     let _ = x * x;
/// }
/// arena.reset();
/// ```
///
/// ```compile_fail
/// use adcore::{Arena, ArenaGuard};
///
/// let mut arena = Arena::<f64>::new();
/// let guard = ArenaGuard::new(&mut arena);
/// arena.reset();
/// drop(guard);
/// ```
pub struct ArenaGuard<'a, F: ArenaThreadLocal> {
    prev: *mut Arena<F>,
    _arena: PhantomData<&'a mut Arena<F>>,
}

impl<'a, F: ArenaThreadLocal> ArenaGuard<'a, F> {
    pub fn new(arena: &'a mut Arena<F>) -> Self {
        let prev = F::cell().with(|cell| {
            let prev = cell.get();
            cell.set(arena as *mut Arena<F>);
            prev
        });
        ArenaGuard {
            prev,
            _arena: PhantomData,
        }
    }
}

impl<F: ArenaThreadLocal> Drop for ArenaGuard<'_, F> {
    fn drop(&mut self) {
        F::cell().with(|cell| {
            cell.set(self.prev);
        });
    }
}
