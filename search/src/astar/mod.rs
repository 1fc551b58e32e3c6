//! A* and its structural variants.
//!
//! Every engine here runs the same loop ([`engine`]) with a different
//! [`FrontierPolicy`]:
//!
//! | engine | policy | open list |
//! |---|---|---|
//! | [`AStar`] | `(g + h, h)` | configured kind |
//! | [`GreedyBestFirst`] | `(h, g)` | configured kind |
//! | [`BoundedAStar`] | `(g + h, h)`, refuses `g + h > bound` | configured kind |
//! | [`MultiHeuristicAStar`] | one list per heuristic, round-robin | configured kind |
//! | [`IdaStar`] | bounded, increasing bound | stack |

pub(crate) mod engine;
mod ida;
pub mod policy;

use meridian_kernel::model::{Heuristic, Problem};

pub use ida::IdaStar;
pub use policy::{
    AStarPolicy, BoundedPolicy, Candidate, FrontierPolicy, GreedyPolicy, MultiHeuristicPolicy,
    Verdict,
};

use crate::budget::Budget;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::FrontierKind;
use crate::node::NodeStore;
use crate::outcome::{SearchOutcome, SearchStatus};
use crate::planner::Planner;
use crate::trace::SearchTrace;
use engine::{finish, run_best_first, LoopSettings};

/// Validate, run one pass of the loop with `policy`, and build the outcome.
pub(crate) fn solve_once<P, F>(
    name: &str,
    problem: &P,
    policy: &mut F,
    config: &SearchConfig,
    kind: FrontierKind,
) -> Result<SearchOutcome<P::Op>, SearchError>
where
    P: Problem,
    F: FrontierPolicy<P::State>,
{
    config.validate()?;
    problem.reset_transition_history();
    let budget = Budget::start(config);
    let settings = LoopSettings {
        kind,
        budget: &budget,
        iteration: 0,
    };
    let trace = config.record_trace.then(|| SearchTrace::new(name));
    let run = run_best_first(problem, policy, NodeStore::new(), &settings, trace);
    finish(problem, run)
}

/// Classic A* with the `(g + h, h)` key.
///
/// Optimal when the heuristic is admissible and consistent.
#[derive(Debug)]
pub struct AStar<H> {
    heuristic: H,
    config: SearchConfig,
    status: SearchStatus,
}

impl<H> AStar<H> {
    #[must_use]
    pub fn new(heuristic: H, config: SearchConfig) -> Self {
        Self {
            heuristic,
            config,
            status: SearchStatus::NotStarted,
        }
    }
}

impl<P, H> Planner<P> for AStar<H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    fn name(&self) -> &'static str {
        "astar"
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        self.status = SearchStatus::InProgress;
        let mut policy = AStarPolicy::new(&self.heuristic);
        let outcome = solve_once(
            "astar",
            problem,
            &mut policy,
            &self.config,
            self.config.frontier,
        );
        self.status = status_of(&outcome);
        outcome
    }
}

/// Greedy best-first search: expands the lowest `h` first.
#[derive(Debug)]
pub struct GreedyBestFirst<H> {
    heuristic: H,
    config: SearchConfig,
    status: SearchStatus,
}

impl<H> GreedyBestFirst<H> {
    #[must_use]
    pub fn new(heuristic: H, config: SearchConfig) -> Self {
        Self {
            heuristic,
            config,
            status: SearchStatus::NotStarted,
        }
    }
}

impl<P, H> Planner<P> for GreedyBestFirst<H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        self.status = SearchStatus::InProgress;
        let mut policy = GreedyPolicy::new(&self.heuristic);
        let outcome = solve_once(
            "greedy",
            problem,
            &mut policy,
            &self.config,
            self.config.frontier,
        );
        self.status = status_of(&outcome);
        outcome
    }
}

/// A* restricted to states with `g + h <= bound`.
#[derive(Debug)]
pub struct BoundedAStar<H> {
    heuristic: H,
    bound: f64,
    config: SearchConfig,
    status: SearchStatus,
    min_exceeded: Option<f64>,
}

impl<H> BoundedAStar<H> {
    #[must_use]
    pub fn new(heuristic: H, bound: f64, config: SearchConfig) -> Self {
        Self {
            heuristic,
            bound,
            config,
            status: SearchStatus::NotStarted,
            min_exceeded: None,
        }
    }

    /// Smallest f-value refused by the last run.
    #[must_use]
    pub fn min_exceeded(&self) -> Option<f64> {
        self.min_exceeded
    }
}

impl<P, H> Planner<P> for BoundedAStar<H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    fn name(&self) -> &'static str {
        "bounded_astar"
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        if self.bound.is_nan() {
            return Err(SearchError::invalid_config("f-bound must not be NaN"));
        }
        self.status = SearchStatus::InProgress;
        let mut policy = BoundedPolicy::new(&self.heuristic, self.bound);
        let outcome = solve_once(
            "bounded_astar",
            problem,
            &mut policy,
            &self.config,
            self.config.frontier,
        );
        self.min_exceeded = policy.min_exceeded();
        self.status = status_of(&outcome);
        outcome
    }
}

/// A* over an ensemble of heuristics sharing one node store.
#[derive(Debug)]
pub struct MultiHeuristicAStar<H> {
    heuristics: Vec<H>,
    config: SearchConfig,
    status: SearchStatus,
}

impl<H> MultiHeuristicAStar<H> {
    #[must_use]
    pub fn new(heuristics: Vec<H>, config: SearchConfig) -> Self {
        Self {
            heuristics,
            config,
            status: SearchStatus::NotStarted,
        }
    }
}

impl<P, H> Planner<P> for MultiHeuristicAStar<H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    fn name(&self) -> &'static str {
        "multi_astar"
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        if self.heuristics.is_empty() {
            return Err(SearchError::invalid_config(
                "multi-heuristic search needs at least one heuristic",
            ));
        }
        self.status = SearchStatus::InProgress;
        let mut policy = MultiHeuristicPolicy::new(&self.heuristics);
        let outcome = solve_once(
            "multi_astar",
            problem,
            &mut policy,
            &self.config,
            self.config.frontier,
        );
        self.status = status_of(&outcome);
        outcome
    }
}

/// Status to remember after a `solve` call.
///
/// A rejected configuration means nothing ran; any other error surfaced
/// after the search and leaves the engine canceled.
pub(crate) fn status_of<O>(outcome: &Result<SearchOutcome<O>, SearchError>) -> SearchStatus {
    match outcome {
        Ok(o) => o.status,
        Err(SearchError::InvalidConfig { .. }) => SearchStatus::NotStarted,
        Err(_) => SearchStatus::Canceled,
    }
}
