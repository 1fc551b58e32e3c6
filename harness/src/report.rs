//! Run report: the auditable record of one engine run over one world.
//!
//! The report's canonical JSON bytes are hashed under
//! [`HashDomain::RunReport`]. Elapsed time is not part of the report, so two
//! runs of a deterministic engine over the same world produce the same
//! digest. The trace itself is persisted separately; the report binds it by
//! digest.

use meridian_kernel::proof::canon::{canonical_json_bytes, real_to_canonical_string, CanonError};
use meridian_kernel::proof::hash::{canonical_hash, ContentHash};
use meridian_kernel::proof::hash_domain::HashDomain;
use meridian_search::trace::{termination_to_json, SearchTrace, TerminationReason};
use meridian_search::{SearchOutcome, SearchStats, SearchStatus, SolutionPlan};
use serde_json::{json, Value};
use std::fmt::Display;

/// A plan as recorded in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRecord {
    /// Textual form, `<op1, op2, ...>`.
    pub text: String,
    pub operators: Vec<String>,
    pub cost: u64,
    /// `canonical_hash(SolutionPlan, canonical plan JSON)`.
    pub digest: ContentHash,
}

impl PlanRecord {
    /// # Errors
    ///
    /// Returns [`CanonError`] if the plan cannot be canonicalized.
    pub fn from_plan<O: Display>(plan: &SolutionPlan<O>) -> Result<Self, CanonError> {
        Ok(Self {
            text: plan.to_string(),
            operators: plan.names(),
            cost: plan.cost(),
            digest: plan.digest()?,
        })
    }

    fn to_json(&self) -> Value {
        json!({
            "cost": self.cost,
            "digest": self.digest.as_str(),
            "operator_count": self.operators.len(),
            "operators": self.operators,
            "text": self.text,
        })
    }
}

/// The record of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub engine: String,
    pub world: String,
    /// Digest of the configuration the engine ran with.
    pub config_digest: ContentHash,
    pub status: SearchStatus,
    pub termination: TerminationReason,
    pub plan: Option<PlanRecord>,
    pub stats: SearchStats,
    pub ida_bounds: Vec<f64>,
    pub trace: Option<SearchTrace>,
    trace_digest: Option<ContentHash>,
}

impl RunReport {
    /// Build a report from a finished outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if the plan or the trace cannot be
    /// canonicalized.
    pub fn from_outcome<O: Display>(
        engine: &str,
        world: &str,
        config_digest: ContentHash,
        outcome: SearchOutcome<O>,
    ) -> Result<Self, CanonError> {
        let plan = outcome.plan.as_ref().map(PlanRecord::from_plan).transpose()?;
        let trace_digest = outcome.trace.as_ref().map(SearchTrace::digest).transpose()?;
        Ok(Self {
            engine: engine.to_owned(),
            world: world.to_owned(),
            config_digest,
            status: outcome.status,
            termination: outcome.termination,
            plan,
            stats: outcome.stats,
            ida_bounds: outcome.ida_bounds,
            trace: outcome.trace,
            trace_digest,
        })
    }

    /// A report for a run abandoned by a caught panic.
    ///
    /// Counters gathered before the panic are kept when available; the plan
    /// and trace are dropped because they were never verified.
    #[must_use]
    pub fn canceled(
        engine: &str,
        world: &str,
        config_digest: ContentHash,
        termination: TerminationReason,
        stats: SearchStats,
    ) -> Self {
        Self {
            engine: engine.to_owned(),
            world: world.to_owned(),
            config_digest,
            status: SearchStatus::Canceled,
            termination,
            plan: None,
            stats,
            ida_bounds: Vec::new(),
            trace: None,
            trace_digest: None,
        }
    }

    #[must_use]
    pub fn solution_found(&self) -> bool {
        self.status == SearchStatus::SolutionFound
    }

    /// Plan length as the sum of operator costs, `0` without a plan.
    #[must_use]
    pub fn plan_length(&self) -> u64 {
        self.plan.as_ref().map_or(0, |p| p.cost)
    }

    #[must_use]
    pub fn operator_count(&self) -> usize {
        self.plan.as_ref().map_or(0, |p| p.operators.len())
    }

    #[must_use]
    pub fn trace_digest(&self) -> Option<&ContentHash> {
        self.trace_digest.as_ref()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let bounds: Vec<String> = self
            .ida_bounds
            .iter()
            .copied()
            .map(real_to_canonical_string)
            .collect();
        json!({
            "config_digest": self.config_digest.as_str(),
            "engine": self.engine,
            "ida_bounds": bounds,
            "plan": self.plan.as_ref().map(PlanRecord::to_json),
            "schema_version": "run_report.v1",
            "solution_found": self.solution_found(),
            "stats": self.stats.to_json(),
            "status": self.status.as_str(),
            "termination": termination_to_json(&self.termination),
            "trace_digest": self.trace_digest.as_ref().map(ContentHash::as_str),
            "world": self.world,
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json())
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::RunReport, &bytes))
    }
}

/// Digest of a configuration snapshot.
///
/// # Errors
///
/// Returns [`CanonError`] if serialization fails.
pub fn config_digest(config: &meridian_search::SearchConfig) -> Result<ContentHash, CanonError> {
    let bytes = canonical_json_bytes(&config.to_json())?;
    Ok(canonical_hash(HashDomain::SearchConfig, &bytes))
}
