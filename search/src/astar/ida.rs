//! Iterative-deepening A*.
//!
//! Each iteration is a bounded, depth-first run of the shared loop on a stack
//! frontier with a fresh reopening node store. The first bound is `h(root)`;
//! each later bound is the smallest f-value the previous iteration refused.
//! One wall-clock budget covers all iterations.

use meridian_kernel::model::{Heuristic, Problem};

use crate::budget::Budget;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::FrontierKind;
use crate::node::NodeStore;
use crate::outcome::{SearchOutcome, SearchStats, SearchStatus};
use crate::planner::Planner;
use crate::trace::{BoundEvent, SearchTrace, TerminationReason, TraceEvent};

use super::engine::{finish, run_best_first, LoopSettings};
use super::policy::BoundedPolicy;
use super::status_of;

/// IDA* over a single heuristic.
#[derive(Debug)]
pub struct IdaStar<H> {
    heuristic: H,
    config: SearchConfig,
    status: SearchStatus,
}

impl<H> IdaStar<H> {
    #[must_use]
    pub fn new(heuristic: H, config: SearchConfig) -> Self {
        Self {
            heuristic,
            config,
            status: SearchStatus::NotStarted,
        }
    }

    fn deepen<P>(&self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError>
    where
        P: Problem,
        H: Heuristic<P::State>,
    {
        self.config.validate()?;
        problem.reset_transition_history();
        let budget = Budget::start(&self.config);
        let mut trace = self.config.record_trace.then(|| SearchTrace::new("ida"));
        let mut totals = SearchStats::default();
        let mut bounds = Vec::new();

        let mut bound = self.heuristic.value(&problem.initial_state());
        if bound.is_infinite() {
            // A dead-end root admits no bound at all.
            let termination = TerminationReason::FrontierExhausted;
            if let Some(t) = trace.as_mut() {
                t.termination = termination.clone();
            }
            totals.elapsed = budget.elapsed();
            return Ok(SearchOutcome {
                status: SearchStatus::NoSolutionExist,
                plan: None,
                stats: totals,
                termination,
                ida_bounds: bounds,
                trace,
            });
        }
        let mut iteration = 0u32;
        loop {
            iteration += 1;
            bounds.push(bound);
            let settings = LoopSettings {
                kind: FrontierKind::Stack,
                budget: &budget,
                iteration,
            };
            let mut policy = BoundedPolicy::new(&self.heuristic, bound);
            let mut run = run_best_first(
                problem,
                &mut policy,
                NodeStore::with_reopening(),
                &settings,
                trace.take(),
            );

            totals.absorb(&run.stats);
            totals.iterations = u64::from(iteration);
            if let Some(t) = run.trace.as_mut() {
                t.push(TraceEvent::Bound(BoundEvent {
                    iteration,
                    bound,
                    expanded: run.stats.expanded,
                }));
            }

            let next = match run.termination {
                TerminationReason::FrontierExhausted => policy.min_exceeded(),
                _ => {
                    run.stats = std::mem::take(&mut totals);
                    run.stats.elapsed = budget.elapsed();
                    let mut outcome = finish(problem, run)?;
                    outcome.ida_bounds = bounds;
                    return Ok(outcome);
                }
            };

            match next {
                Some(next) if next > bound => {
                    bound = next;
                    trace = run.trace;
                }
                _ => {
                    // Nothing refused: the whole reachable space fits the bound.
                    let termination = TerminationReason::BoundExhausted { bound };
                    let mut trace = run.trace;
                    if let Some(t) = trace.as_mut() {
                        t.termination = termination.clone();
                    }
                    totals.elapsed = budget.elapsed();
                    return Ok(SearchOutcome {
                        status: SearchStatus::NoSolutionExist,
                        plan: None,
                        stats: totals,
                        termination,
                        ida_bounds: bounds,
                        trace,
                    });
                }
            }
        }
    }
}

impl<P, H> Planner<P> for IdaStar<H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    fn name(&self) -> &'static str {
        "ida"
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        self.status = SearchStatus::InProgress;
        let outcome = self.deepen(problem);
        self.status = status_of(&outcome);
        outcome
    }
}
