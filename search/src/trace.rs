//! Search trace: an ordered audit log of engine decisions.
//!
//! Recording is opt-in (`SearchConfig::record_trace`). The normative surface
//! is the ordered event list plus the termination reason; the canonical JSON
//! form is hashed under [`HashDomain::SearchTrace`].

use meridian_kernel::proof::canon::{canonical_json_bytes, real_to_canonical_string, CanonError};
use meridian_kernel::proof::hash::{canonical_hash, ContentHash};
use meridian_kernel::proof::hash_domain::HashDomain;
use serde_json::{json, Value};

use crate::frontier::PriorityKey;

/// Why an engine stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationReason {
    /// A goal node was closed (best-first) or the best trajectory is final.
    GoalReached { node: usize },
    /// The open list emptied without reaching a goal.
    FrontierExhausted,
    /// IDA* found nothing beyond the last bound.
    BoundExhausted { bound: f64 },
    /// Wall-clock budget hit.
    TimeLimit,
    /// Node-store or tree size exceeded `max_nodes`.
    NodeLimit { stored: usize },
    /// An allocation failed while growing the store or a frontier.
    AllocationFailure,
    /// A frontier reported entries but returned none.
    FrontierInvariantViolation,
    /// MCTS ran `patience` iterations without improving its best plan.
    PatienceExhausted { iterations: u64 },
    /// Every MCTS child of the root is finished.
    RootExhausted,
    /// A collaborator panicked and the harness caught it.
    InternalPanic { stage: PanicStage },
}

/// Where a caught panic happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicStage {
    Solve,
    PlanReplay,
}

impl PanicStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solve => "solve",
            Self::PlanReplay => "plan_replay",
        }
    }
}

/// Counts of what happened to the successors of one expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuccessorTally {
    pub generated: u32,
    pub inserted: u32,
    pub improved: u32,
    pub rejected: u32,
    pub dead_ends: u32,
    pub pruned: u32,
    /// Dropped by a width filter.
    pub filtered: u32,
}

/// One frontier pop that led to an expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandEvent {
    /// Total order of expansions within the run.
    pub order: u64,
    /// Store index of the expanded node.
    pub node: usize,
    pub g: u64,
    pub pop_key: PriorityKey,
    /// Which open list the node came from.
    pub frontier: usize,
    /// IDA* iteration, `0` for single-pass engines.
    pub iteration: u32,
    pub successors: SuccessorTally,
}

/// One MCTS iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutEvent {
    pub iteration: u64,
    pub policy: &'static str,
    pub steps: usize,
    pub score: f64,
    pub reached_goal: bool,
}

/// One IDA* bound.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEvent {
    pub iteration: u32,
    pub bound: f64,
    pub expanded: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Expand(ExpandEvent),
    Bound(BoundEvent),
    Rollout(RolloutEvent),
}

/// The recorded decision log of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTrace {
    pub engine: String,
    pub events: Vec<TraceEvent>,
    pub termination: TerminationReason,
}

impl SearchTrace {
    #[must_use]
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            events: Vec::new(),
            termination: TerminationReason::FrontierExhausted,
        }
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Number of expansion events.
    #[must_use]
    pub fn expansions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Expand(_)))
            .count()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "engine": self.engine,
            "events": self.events.iter().map(event_to_json).collect::<Vec<_>>(),
            "termination": termination_to_json(&self.termination),
        })
    }

    /// Serialize to canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json())
    }

    /// Domain-separated hash of the canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::SearchTrace, &bytes))
    }
}

fn key_to_json(k: PriorityKey) -> Value {
    json!({
        "primary": real_to_canonical_string(k.primary),
        "secondary": real_to_canonical_string(k.secondary),
    })
}

fn event_to_json(e: &TraceEvent) -> Value {
    match e {
        TraceEvent::Expand(x) => json!({
            "frontier": x.frontier,
            "g": x.g,
            "iteration": x.iteration,
            "node": x.node,
            "order": x.order,
            "pop_key": key_to_json(x.pop_key),
            "successors": {
                "dead_ends": x.successors.dead_ends,
                "filtered": x.successors.filtered,
                "generated": x.successors.generated,
                "improved": x.successors.improved,
                "inserted": x.successors.inserted,
                "pruned": x.successors.pruned,
                "rejected": x.successors.rejected,
            },
            "type": "expand",
        }),
        TraceEvent::Bound(b) => json!({
            "bound": real_to_canonical_string(b.bound),
            "expanded": b.expanded,
            "iteration": b.iteration,
            "type": "bound",
        }),
        TraceEvent::Rollout(r) => json!({
            "iteration": r.iteration,
            "policy": r.policy,
            "reached_goal": r.reached_goal,
            "score": real_to_canonical_string(r.score),
            "steps": r.steps,
            "type": "rollout",
        }),
    }
}

/// JSON form of a termination reason, shared with run reports.
#[must_use]
pub fn termination_to_json(r: &TerminationReason) -> Value {
    match r {
        TerminationReason::GoalReached { node } => json!({"node": node, "type": "goal_reached"}),
        TerminationReason::FrontierExhausted => json!({"type": "frontier_exhausted"}),
        TerminationReason::BoundExhausted { bound } => {
            json!({"bound": real_to_canonical_string(*bound), "type": "bound_exhausted"})
        }
        TerminationReason::TimeLimit => json!({"type": "time_limit"}),
        TerminationReason::NodeLimit { stored } => json!({"stored": stored, "type": "node_limit"}),
        TerminationReason::AllocationFailure => json!({"type": "allocation_failure"}),
        TerminationReason::FrontierInvariantViolation => {
            json!({"type": "frontier_invariant_violation"})
        }
        TerminationReason::PatienceExhausted { iterations } => {
            json!({"iterations": iterations, "type": "patience_exhausted"})
        }
        TerminationReason::RootExhausted => json!({"type": "root_exhausted"}),
        TerminationReason::InternalPanic { stage } => {
            json!({"stage": stage.as_str(), "type": "internal_panic"})
        }
    }
}
