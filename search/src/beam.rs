//! Width-bounded best-first search.
//!
//! Runs the shared best-first loop with the A* key, but keeps only the
//! `beam_width` best successors of each expansion, ranked by
//! `operator_cost + h`. Branching per expansion is bounded regardless of the
//! model, at the price of completeness and optimality.

use std::cmp::Ordering;

use meridian_kernel::model::{Heuristic, HeuristicStats, Problem};

use crate::astar::policy::{Candidate, FrontierPolicy, Verdict};
use crate::astar::{solve_once, status_of, AStarPolicy};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::FrontierKind;
use crate::outcome::{SearchOutcome, SearchStatus};
use crate::planner::Planner;

/// A sorted list holding at most `width` items, lowest score first.
///
/// An item is refused when the list is full and its score is not strictly
/// better than the worst kept. Accepted items go after any equal scores, so
/// earlier offers win ties.
#[derive(Debug, Clone)]
pub struct BoundedBest<T> {
    width: usize,
    items: Vec<(f64, T)>,
}

impl<T> BoundedBest<T> {
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            items: Vec::with_capacity(width),
        }
    }

    /// Offer `item`; returns whether it was kept.
    pub fn offer(&mut self, score: f64, item: T) -> bool {
        if self.width == 0 {
            return false;
        }
        if self.items.len() == self.width {
            let worst = self.items[self.width - 1].0;
            if score.total_cmp(&worst) != Ordering::Less {
                return false;
            }
        }
        let at = self
            .items
            .partition_point(|(s, _)| s.total_cmp(&score) != Ordering::Greater);
        self.items.insert(at, (score, item));
        if self.items.len() > self.width {
            self.items.pop();
        }
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Kept items, best first.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items.into_iter().map(|(_, item)| item).collect()
    }
}

/// A* keys plus a per-expansion width filter.
pub struct BeamPolicy<'h, H> {
    inner: AStarPolicy<'h, H>,
    width: usize,
}

impl<'h, H> BeamPolicy<'h, H> {
    #[must_use]
    pub fn new(heuristic: &'h H, width: usize) -> Self {
        Self {
            inner: AStarPolicy::new(heuristic),
            width,
        }
    }
}

impl<S, H: Heuristic<S>> FrontierPolicy<S> for BeamPolicy<'_, H> {
    fn evaluate(&mut self, state: &S, g: u64) -> Verdict {
        self.inner.evaluate(state, g)
    }

    fn filters(&self) -> bool {
        true
    }

    fn filter(&mut self, candidates: &mut Vec<Candidate<S>>) -> usize {
        let before = candidates.len();
        let mut best = BoundedBest::new(self.width);
        for candidate in candidates.drain(..) {
            let score = f64::from(candidate.operator_cost) + candidate.h;
            best.offer(score, candidate);
        }
        candidates.extend(best.into_items());
        before - candidates.len()
    }

    fn heuristic_stats(&self) -> Vec<(String, HeuristicStats)> {
        FrontierPolicy::<S>::heuristic_stats(&self.inner)
    }
}

/// Beam search on a binary-heap frontier.
#[derive(Debug)]
pub struct BeamStackSearch<H> {
    heuristic: H,
    config: SearchConfig,
    status: SearchStatus,
}

impl<H> BeamStackSearch<H> {
    /// Width comes from [`SearchConfig::beam_width`].
    #[must_use]
    pub fn new(heuristic: H, config: SearchConfig) -> Self {
        Self {
            heuristic,
            config,
            status: SearchStatus::NotStarted,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.config.beam_width
    }
}

impl<P, H> Planner<P> for BeamStackSearch<H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    fn name(&self) -> &'static str {
        "beam"
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        self.status = SearchStatus::InProgress;
        let mut policy = BeamPolicy::new(&self.heuristic, self.config.beam_width);
        let outcome = solve_once(
            "beam",
            problem,
            &mut policy,
            &self.config,
            FrontierKind::BinaryHeap,
        );
        self.status = status_of(&outcome);
        outcome
    }
}
