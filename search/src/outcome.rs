//! Run status, counters and the result record every engine returns.

use std::fmt;
use std::time::Duration;

use meridian_kernel::model::HeuristicStats;
use meridian_kernel::proof::canon::real_to_canonical_string;
use serde_json::{json, Value};

use crate::plan::SolutionPlan;
use crate::trace::{termination_to_json, SearchTrace, TerminationReason};

/// Engine lifecycle.
///
/// `NotStarted -> InProgress -> {SolutionFound | NoSolutionExist |
/// TimeLimitExceeded | MemoryLimitExceeded | Canceled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    NotStarted,
    InProgress,
    SolutionFound,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    NoSolutionExist,
    /// The run was abandoned: a collaborator panicked or a frontier broke its
    /// contract.
    Canceled,
}

impl SearchStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::NotStarted | Self::InProgress)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::SolutionFound => "solution_found",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::NoSolutionExist => "no_solution_exist",
            Self::Canceled => "canceled",
        }
    }

    /// The status a termination reason implies when no plan is attached.
    #[must_use]
    pub fn from_termination(reason: &TerminationReason) -> Self {
        match reason {
            TerminationReason::GoalReached { .. } => Self::SolutionFound,
            TerminationReason::FrontierExhausted
            | TerminationReason::BoundExhausted { .. }
            | TerminationReason::RootExhausted
            | TerminationReason::PatienceExhausted { .. } => Self::NoSolutionExist,
            TerminationReason::TimeLimit => Self::TimeLimitExceeded,
            TerminationReason::NodeLimit { .. } | TerminationReason::AllocationFailure => {
                Self::MemoryLimitExceeded
            }
            TerminationReason::FrontierInvariantViolation
            | TerminationReason::InternalPanic { .. } => Self::Canceled,
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic counters of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes closed and expanded (MCTS: tree expansions).
    pub expanded: u64,
    /// Successors produced.
    pub generated: u64,
    /// Frontier pops discarded because the node was already closed.
    pub stale_pops: u64,
    /// Closed nodes reopened by a cheaper path (IDA* only).
    pub reopened: u64,
    /// Successors dropped for an infinite heuristic.
    pub dead_ends: u64,
    /// Successors dropped by an f-bound.
    pub pruned: u64,
    /// IDA* bounds tried or MCTS iterations run.
    pub iterations: u64,
    pub elapsed: Duration,
    pub frontier_high_water: u64,
    /// Node-store size (MCTS: tree size) at termination.
    pub stored_nodes: usize,
    /// Statistics per heuristic, in configuration order.
    pub heuristics: Vec<(String, HeuristicStats)>,
}

impl SearchStats {
    /// Smallest finite heuristic value seen by any heuristic.
    #[must_use]
    pub fn best_heuristic(&self) -> Option<f64> {
        self.merged_heuristics().best
    }

    /// Mean finite heuristic value over all heuristics.
    #[must_use]
    pub fn average_heuristic(&self) -> Option<f64> {
        self.merged_heuristics().average()
    }

    fn merged_heuristics(&self) -> HeuristicStats {
        let mut all = HeuristicStats::new();
        for (_, s) in &self.heuristics {
            all.merge(s);
        }
        all
    }

    /// Fold the counters of another run (used across IDA* iterations).
    pub fn absorb(&mut self, other: &SearchStats) {
        self.expanded += other.expanded;
        self.generated += other.generated;
        self.stale_pops += other.stale_pops;
        self.reopened += other.reopened;
        self.dead_ends += other.dead_ends;
        self.pruned += other.pruned;
        self.frontier_high_water = self.frontier_high_water.max(other.frontier_high_water);
        self.stored_nodes = self.stored_nodes.max(other.stored_nodes);
        for (name, stats) in &other.heuristics {
            match self.heuristics.iter_mut().find(|(n, _)| n == name) {
                Some((_, mine)) => mine.merge(stats),
                None => self.heuristics.push((name.clone(), stats.clone())),
            }
        }
    }

    /// JSON form. Elapsed time is excluded so equal runs hash equally.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let real = |v: Option<f64>| v.map(real_to_canonical_string);
        json!({
            "dead_ends": self.dead_ends,
            "expanded": self.expanded,
            "frontier_high_water": self.frontier_high_water,
            "generated": self.generated,
            "heuristics": self.heuristics.iter().map(|(name, s)| json!({
                "average": real(s.average()),
                "best": real(s.best),
                "calls": s.calls,
                "dead_ends": s.dead_ends,
                "name": name,
            })).collect::<Vec<_>>(),
            "iterations": self.iterations,
            "pruned": self.pruned,
            "reopened": self.reopened,
            "stale_pops": self.stale_pops,
            "stored_nodes": self.stored_nodes,
        })
    }
}

/// What `solve` returns.
#[derive(Debug, Clone)]
pub struct SearchOutcome<O> {
    pub status: SearchStatus,
    /// Present on `SolutionFound`. MCTS also attaches its best plan so far
    /// when a budget stops it.
    pub plan: Option<SolutionPlan<O>>,
    pub stats: SearchStats,
    pub termination: TerminationReason,
    /// IDA* bounds in the order they were tried.
    pub ida_bounds: Vec<f64>,
    pub trace: Option<SearchTrace>,
}

impl<O> SearchOutcome<O> {
    #[must_use]
    pub fn solution_found(&self) -> bool {
        self.status == SearchStatus::SolutionFound
    }

    /// Plan length as the sum of operator costs, `0` without a plan.
    #[must_use]
    pub fn plan_length(&self) -> u64 {
        self.plan.as_ref().map_or(0, SolutionPlan::cost)
    }

    /// Number of operators in the plan, `0` without one.
    #[must_use]
    pub fn operator_count(&self) -> usize {
        self.plan.as_ref().map_or(0, SolutionPlan::len)
    }

    #[must_use]
    pub fn plan_cost(&self) -> Option<u64> {
        self.plan.as_ref().map(SolutionPlan::cost)
    }
}

impl<O: fmt::Display> SearchOutcome<O> {
    /// JSON summary without the trace (which is persisted separately).
    #[must_use]
    pub fn to_json(&self) -> Value {
        let bounds: Vec<String> = self
            .ida_bounds
            .iter()
            .copied()
            .map(real_to_canonical_string)
            .collect();
        json!({
            "ida_bounds": bounds,
            "plan": self.plan.as_ref().map(SolutionPlan::to_json),
            "solution_found": self.solution_found(),
            "stats": self.stats.to_json(),
            "status": self.status.as_str(),
            "termination": termination_to_json(&self.termination),
        })
    }
}
