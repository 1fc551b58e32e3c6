//! Problem, operator and successor contracts.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A planning state.
///
/// Value equality and a stable hash identify a state; `clone()` is the
/// deep-copy operation. States carry no back-pointer to their parent.
pub trait State: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> State for T {}

/// A grounded operator.
///
/// Operators are never mutated by the search. `Display` renders the name used
/// in a plan's textual form.
pub trait Operator<S>: Clone + Display {
    /// Non-negative cost of applying this operator.
    fn cost(&self) -> u32;

    /// Stable order index, unique per grounded operator.
    fn order_index(&self) -> usize;

    /// Apply the operator to `state`, producing an independently owned state.
    ///
    /// Must be pure: the same input state always yields an equal output.
    fn apply(&self, state: &S) -> S;
}

/// A lazy `(operator, origin)` pair.
///
/// The resulting state is only materialised by [`Successor::state`], so
/// discarded candidates never pay for a state copy.
#[derive(Debug, Clone)]
pub struct Successor<'a, S, O> {
    /// The operator producing this successor.
    pub operator: O,
    /// The state the operator is applied to.
    pub origin: &'a S,
}

impl<'a, S, O: Operator<S>> Successor<'a, S, O> {
    #[must_use]
    pub fn new(operator: O, origin: &'a S) -> Self {
        Self { operator, origin }
    }

    /// Materialise the successor state.
    #[must_use]
    pub fn state(&self) -> S {
        self.operator.apply(self.origin)
    }

    /// Cost of the producing operator.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.operator.cost()
    }
}

/// The planning problem contract consumed by every engine.
///
/// # Contract
///
/// - `all_successors` must be deterministic: the same state yields the same
///   operators in the same order. Plan extraction relies on this order to
///   re-derive which operator produced a state.
/// - `all_predecessors` is only used by pattern-database style
///   precomputation; the search core never calls it.
pub trait Problem {
    type State: State;
    type Op: Operator<Self::State>;

    /// The initial state of the problem.
    fn initial_state(&self) -> Self::State;

    /// Whether `state` satisfies the goal.
    fn is_goal(&self, state: &Self::State) -> bool;

    /// Enumerate every applicable operator as a lazy successor.
    fn all_successors<'s>(
        &self,
        state: &'s Self::State,
    ) -> Vec<Successor<'s, Self::State, Self::Op>>;

    /// Enumerate every `(operator, predecessor)` pair leading into `state`.
    fn all_predecessors(&self, state: &Self::State) -> Vec<(Self::Op, Self::State)>;

    /// Forget any transition caches the model keeps between runs.
    fn reset_transition_history(&self) {}
}
