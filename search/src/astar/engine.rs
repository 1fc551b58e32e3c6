//! The best-first loop every A* variant and beam search share.

use meridian_kernel::model::Problem;

use crate::budget::Budget;
use crate::error::SearchError;
use crate::frontier::{Frontier, FrontierKind, PriorityKey};
use crate::node::{NodeId, NodeStore, UpdateOutcome};
use crate::outcome::{SearchOutcome, SearchStats, SearchStatus};
use crate::plan::extract_plan;
use crate::trace::{ExpandEvent, SearchTrace, SuccessorTally, TerminationReason, TraceEvent};

use super::policy::{Candidate, FrontierPolicy, Verdict};

/// Where the loop stopped and what it left behind.
#[derive(Debug)]
pub(crate) struct BestFirstRun<S> {
    pub store: NodeStore<S>,
    pub termination: TerminationReason,
    pub goal: Option<NodeId>,
    pub stats: SearchStats,
    pub trace: Option<SearchTrace>,
}

/// Fixed inputs of one loop run.
pub(crate) struct LoopSettings<'b> {
    pub kind: FrontierKind,
    pub budget: &'b Budget,
    /// IDA* iteration number recorded in trace events.
    pub iteration: u32,
}

/// Run best-first search until a goal is closed, the open lists empty, or a
/// budget stops it.
///
/// The budget is checked once per pop and once per generated successor. The
/// node ceiling is checked after every store insertion.
#[allow(clippy::too_many_lines)]
pub(crate) fn run_best_first<P, F>(
    problem: &P,
    policy: &mut F,
    mut store: NodeStore<P::State>,
    settings: &LoopSettings<'_>,
    mut trace: Option<SearchTrace>,
) -> BestFirstRun<P::State>
where
    P: Problem,
    F: FrontierPolicy<P::State>,
{
    let budget = settings.budget;
    let mut stats = SearchStats::default();
    let mut frontiers: Vec<Box<dyn Frontier<NodeId>>> = (0..policy.frontier_count())
        .map(|_| settings.kind.build())
        .collect();

    let termination = 'search: {
        let root = problem.initial_state();
        let keys = match policy.evaluate(&root, 0) {
            Verdict::Keys { keys, .. } => keys,
            Verdict::DeadEnd => {
                stats.dead_ends += 1;
                break 'search TerminationReason::FrontierExhausted;
            }
            Verdict::Pruned => {
                stats.pruned += 1;
                break 'search TerminationReason::FrontierExhausted;
            }
        };
        let root_id = match store.try_update(&root, 0, None) {
            Ok((_, id)) => id,
            Err(_) => break 'search TerminationReason::AllocationFailure,
        };
        for (which, key) in keys {
            if frontiers[which].try_reserve(1).is_err() {
                break 'search TerminationReason::AllocationFailure;
            }
            frontiers[which].insert(key, root_id);
        }

        let mut order = 0u64;
        loop {
            if budget.time_exceeded() {
                break 'search TerminationReason::TimeLimit;
            }
            if budget.nodes_exceeded(store.len()) {
                break 'search TerminationReason::NodeLimit {
                    stored: store.len(),
                };
            }

            let Some(which) = policy.next_frontier(&frontiers) else {
                break 'search TerminationReason::FrontierExhausted;
            };
            let pop_key = frontiers[which]
                .peek_min_key()
                .unwrap_or(PriorityKey::new(f64::NAN));
            let Some(id) = frontiers[which].remove_min() else {
                break 'search TerminationReason::FrontierInvariantViolation;
            };
            if !store.close(id) {
                stats.stale_pops += 1;
                continue;
            }

            let state = store.state(id).clone();
            if problem.is_goal(&state) {
                break 'search TerminationReason::GoalReached { node: id.index() };
            }

            stats.expanded += 1;
            let g = store.best_cost(id);
            let mut tally = SuccessorTally::default();
            let stop = expand(
                problem,
                policy,
                &mut store,
                &mut frontiers,
                budget,
                (id, g, &state),
                &mut tally,
            );

            stats.generated += u64::from(tally.generated);
            stats.dead_ends += u64::from(tally.dead_ends);
            stats.pruned += u64::from(tally.pruned);
            if let Some(trace) = trace.as_mut() {
                trace.push(TraceEvent::Expand(ExpandEvent {
                    order,
                    node: id.index(),
                    g,
                    pop_key,
                    frontier: which,
                    iteration: settings.iteration,
                    successors: tally,
                }));
            }
            order += 1;

            if let Some(reason) = stop {
                break 'search reason;
            }
        }
    };

    stats.reopened = store.reopened();
    stats.stored_nodes = store.len();
    stats.frontier_high_water = frontiers.iter().map(|f| f.high_water()).sum();
    stats.elapsed = budget.elapsed();
    stats.heuristics = policy.heuristic_stats();

    let goal = match termination {
        TerminationReason::GoalReached { node } => Some(NodeId(node)),
        _ => None,
    };
    if let Some(trace) = trace.as_mut() {
        trace.termination = termination.clone();
    }
    BestFirstRun {
        store,
        termination,
        goal,
        stats,
        trace,
    }
}

/// Generate, evaluate, filter and store the successors of one node.
///
/// Returns the reason to stop, if a budget or allocation broke off the
/// expansion.
fn expand<P, F>(
    problem: &P,
    policy: &mut F,
    store: &mut NodeStore<P::State>,
    frontiers: &mut [Box<dyn Frontier<NodeId>>],
    budget: &Budget,
    (id, g, state): (NodeId, u64, &P::State),
    tally: &mut SuccessorTally,
) -> Option<TerminationReason>
where
    P: Problem,
    F: FrontierPolicy<P::State>,
{
    let ranks_all = policy.filters();
    let mut candidates: Vec<Candidate<P::State>> = Vec::new();

    for succ in problem.all_successors(state) {
        if budget.time_exceeded() {
            return Some(TerminationReason::TimeLimit);
        }
        tally.generated += 1;
        let operator_cost = succ.cost();
        let g2 = g + u64::from(operator_cost);
        let child = succ.state();
        if !ranks_all && store.would_reject(&child, g2) {
            tally.rejected += 1;
            continue;
        }
        match policy.evaluate(&child, g2) {
            Verdict::Keys { h, keys } => candidates.push(Candidate {
                state: child,
                operator_cost,
                g: g2,
                h,
                keys,
            }),
            Verdict::DeadEnd => tally.dead_ends += 1,
            Verdict::Pruned => tally.pruned += 1,
        }
    }

    let dropped = policy.filter(&mut candidates);
    tally.filtered = u32::try_from(dropped).unwrap_or(u32::MAX);

    for candidate in candidates {
        let (outcome, child_id) = match store.try_update(&candidate.state, candidate.g, Some(id)) {
            Ok(updated) => updated,
            Err(_) => return Some(TerminationReason::AllocationFailure),
        };
        match outcome {
            UpdateOutcome::Rejected => {
                tally.rejected += 1;
                continue;
            }
            UpdateOutcome::Inserted => tally.inserted += 1,
            UpdateOutcome::Improved => tally.improved += 1,
        }
        for (which, key) in candidate.keys {
            if frontiers[which].try_reserve(1).is_err() {
                return Some(TerminationReason::AllocationFailure);
            }
            frontiers[which].insert(key, child_id);
        }
        if budget.nodes_exceeded(store.len()) {
            return Some(TerminationReason::NodeLimit {
                stored: store.len(),
            });
        }
    }
    None
}

/// Turn a finished run into an outcome, rebuilding the plan on success.
///
/// # Errors
///
/// Returns [`SearchError::BrokenPredecessorChain`] if the plan cannot be
/// re-derived from the store.
pub(crate) fn finish<P: Problem>(
    problem: &P,
    run: BestFirstRun<P::State>,
) -> Result<SearchOutcome<P::Op>, SearchError> {
    let plan = match run.goal {
        Some(goal) => Some(extract_plan(problem, &run.store, goal)?),
        None => None,
    };
    Ok(SearchOutcome {
        status: SearchStatus::from_termination(&run.termination),
        plan,
        stats: run.stats,
        termination: run.termination,
        ida_bounds: Vec::new(),
        trace: run.trace,
    })
}
