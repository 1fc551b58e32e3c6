//! Typed search errors.
//!
//! `SearchError` covers pre-flight configuration failures and model-contract
//! violations found while rebuilding or replaying a plan. Resource exhaustion
//! is never an error: it is reported through
//! [`crate::outcome::SearchStatus`].

/// Typed failure returned by engines and plan utilities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// A configuration value is out of range. Returned before any search step.
    #[error("invalid search configuration: {detail}")]
    InvalidConfig { detail: String },

    /// Plan extraction found no operator of the predecessor producing the
    /// recorded successor (non-deterministic successor generation).
    #[error("broken predecessor chain: {detail}")]
    BrokenPredecessorChain { detail: String },

    /// Replaying a plan from the initial state did not reach a goal, or its
    /// cost disagrees with the recorded plan cost.
    #[error("plan replay failed: {detail}")]
    PlanReplay { detail: String },
}

impl SearchError {
    pub(crate) fn invalid_config(detail: impl Into<String>) -> Self {
        Self::InvalidConfig {
            detail: detail.into(),
        }
    }
}
