//! Insertion and selection rules for the shared best-first loop.
//!
//! A [`FrontierPolicy`] decides three things: how many open lists exist, which
//! key(s) a successor gets (or whether it is dropped), and which open list is
//! popped next. Everything else, including closure, duplicate suppression,
//! budgets and plan extraction, lives in the loop.

use meridian_kernel::model::{Heuristic, HeuristicStats};

use crate::frontier::{Frontier, PriorityKey};
use crate::node::NodeId;

/// What a policy decided about one state.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Insert into each listed open list with the paired key.
    Keys { h: f64, keys: Vec<(usize, PriorityKey)> },
    /// A heuristic proved the state cannot reach a goal.
    DeadEnd,
    /// Outside the current f-bound.
    Pruned,
}

/// A successor that survived evaluation, waiting for the store update.
#[derive(Debug, Clone)]
pub struct Candidate<S> {
    pub state: S,
    pub operator_cost: u32,
    pub g: u64,
    pub h: f64,
    pub keys: Vec<(usize, PriorityKey)>,
}

/// Strategy injected into the best-first loop.
pub trait FrontierPolicy<S> {
    /// Number of open lists the loop must allocate.
    fn frontier_count(&self) -> usize {
        1
    }

    /// Score `state` reached at path cost `g`.
    fn evaluate(&mut self, state: &S, g: u64) -> Verdict;

    /// Open list to pop from next, `None` when every list is empty.
    fn next_frontier(&mut self, frontiers: &[Box<dyn Frontier<NodeId>>]) -> Option<usize> {
        frontiers.iter().position(|f| !f.is_empty())
    }

    /// Whether [`FrontierPolicy::filter`] ranks successors. When it does the
    /// loop evaluates every successor, duplicates included, before filtering.
    fn filters(&self) -> bool {
        false
    }

    /// Drop candidates before they reach the store. Returns how many were
    /// dropped.
    fn filter(&mut self, _candidates: &mut Vec<Candidate<S>>) -> usize {
        0
    }

    /// Statistics per heuristic, in configuration order.
    fn heuristic_stats(&self) -> Vec<(String, HeuristicStats)>;
}

#[allow(clippy::cast_precision_loss)]
fn real(g: u64) -> f64 {
    g as f64
}

/// Single heuristic with running statistics.
pub(crate) struct Scored<'h, H> {
    heuristic: &'h H,
    stats: HeuristicStats,
}

impl<'h, H> Scored<'h, H> {
    pub(crate) fn new(heuristic: &'h H) -> Self {
        Self {
            heuristic,
            stats: HeuristicStats::new(),
        }
    }

    fn value<S>(&mut self, state: &S) -> f64
    where
        H: Heuristic<S>,
    {
        let h = self.heuristic.value(state);
        self.stats.record(h);
        h
    }

    fn report<S>(&self) -> Vec<(String, HeuristicStats)>
    where
        H: Heuristic<S>,
    {
        vec![(Heuristic::<S>::name(self.heuristic).to_string(), self.stats.clone())]
    }
}

/// A*: key `(g + h, h)`.
pub struct AStarPolicy<'h, H> {
    scored: Scored<'h, H>,
}

impl<'h, H> AStarPolicy<'h, H> {
    #[must_use]
    pub fn new(heuristic: &'h H) -> Self {
        Self {
            scored: Scored::new(heuristic),
        }
    }
}

impl<S, H: Heuristic<S>> FrontierPolicy<S> for AStarPolicy<'_, H> {
    fn evaluate(&mut self, state: &S, g: u64) -> Verdict {
        let h = self.scored.value(state);
        if h.is_infinite() {
            return Verdict::DeadEnd;
        }
        Verdict::Keys {
            h,
            keys: vec![(0, PriorityKey::with_tie_break(real(g) + h, h))],
        }
    }

    fn heuristic_stats(&self) -> Vec<(String, HeuristicStats)> {
        self.scored.report::<S>()
    }
}

/// Greedy best-first: key `(h, g)`. Path cost only breaks ties.
pub struct GreedyPolicy<'h, H> {
    scored: Scored<'h, H>,
}

impl<'h, H> GreedyPolicy<'h, H> {
    #[must_use]
    pub fn new(heuristic: &'h H) -> Self {
        Self {
            scored: Scored::new(heuristic),
        }
    }
}

impl<S, H: Heuristic<S>> FrontierPolicy<S> for GreedyPolicy<'_, H> {
    fn evaluate(&mut self, state: &S, g: u64) -> Verdict {
        let h = self.scored.value(state);
        if h.is_infinite() {
            return Verdict::DeadEnd;
        }
        Verdict::Keys {
            h,
            keys: vec![(0, PriorityKey::with_tie_break(h, real(g)))],
        }
    }

    fn heuristic_stats(&self) -> Vec<(String, HeuristicStats)> {
        self.scored.report::<S>()
    }
}

/// A* that refuses states with `g + h > bound`.
///
/// Keeps the smallest refused f-value so iterative deepening can pick the
/// next bound.
pub struct BoundedPolicy<'h, H> {
    scored: Scored<'h, H>,
    bound: f64,
    min_exceeded: Option<f64>,
}

impl<'h, H> BoundedPolicy<'h, H> {
    #[must_use]
    pub fn new(heuristic: &'h H, bound: f64) -> Self {
        Self {
            scored: Scored::new(heuristic),
            bound,
            min_exceeded: None,
        }
    }

    #[must_use]
    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Smallest f-value refused so far.
    #[must_use]
    pub fn min_exceeded(&self) -> Option<f64> {
        self.min_exceeded
    }
}

impl<S, H: Heuristic<S>> FrontierPolicy<S> for BoundedPolicy<'_, H> {
    fn evaluate(&mut self, state: &S, g: u64) -> Verdict {
        let h = self.scored.value(state);
        if h.is_infinite() {
            return Verdict::DeadEnd;
        }
        let f = real(g) + h;
        if f > self.bound {
            self.min_exceeded = Some(self.min_exceeded.map_or(f, |m| m.min(f)));
            return Verdict::Pruned;
        }
        Verdict::Keys {
            h,
            keys: vec![(0, PriorityKey::with_tie_break(f, h))],
        }
    }

    fn heuristic_stats(&self) -> Vec<(String, HeuristicStats)> {
        self.scored.report::<S>()
    }
}

/// One open list per heuristic, popped round-robin.
///
/// Every state is scored by every heuristic and enters every list; any
/// heuristic reporting a dead end discards it.
pub struct MultiHeuristicPolicy<'h, H> {
    heuristics: Vec<Scored<'h, H>>,
    cursor: usize,
}

impl<'h, H> MultiHeuristicPolicy<'h, H> {
    #[must_use]
    pub fn new(heuristics: &'h [H]) -> Self {
        Self {
            heuristics: heuristics.iter().map(Scored::new).collect(),
            cursor: 0,
        }
    }
}

impl<S, H: Heuristic<S>> FrontierPolicy<S> for MultiHeuristicPolicy<'_, H> {
    fn frontier_count(&self) -> usize {
        self.heuristics.len()
    }

    fn evaluate(&mut self, state: &S, g: u64) -> Verdict {
        let values: Vec<f64> = self.heuristics.iter_mut().map(|s| s.value(state)).collect();
        if values.iter().any(|h| h.is_infinite()) {
            return Verdict::DeadEnd;
        }
        let keys = values
            .iter()
            .enumerate()
            .map(|(i, &h)| (i, PriorityKey::with_tie_break(real(g) + h, h)))
            .collect();
        Verdict::Keys {
            h: values.first().copied().unwrap_or(0.0),
            keys,
        }
    }

    fn next_frontier(&mut self, frontiers: &[Box<dyn Frontier<NodeId>>]) -> Option<usize> {
        let n = frontiers.len();
        let chosen = (0..n)
            .map(|offset| (self.cursor + offset) % n)
            .find(|&i| !frontiers[i].is_empty())?;
        self.cursor = (chosen + 1) % n;
        Some(chosen)
    }

    fn heuristic_stats(&self) -> Vec<(String, HeuristicStats)> {
        self.heuristics
            .iter()
            .flat_map(|s| s.report::<S>())
            .collect()
    }
}
