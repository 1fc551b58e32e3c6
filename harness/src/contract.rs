//! World contract: what a world must provide to be run by the harness.
//!
//! A world is a [`Problem`] plus the heuristics it offers. Worlds may NOT
//! implement search, plan replay or report hashing; those are runner
//! concerns.

use meridian_kernel::model::{Heuristic, Problem};

/// A problem model the runner can drive end-to-end.
pub trait World: Problem {
    /// Stable identifier recorded in reports.
    fn world_id(&self) -> &str;

    /// Heuristics offered by this world, most informed first.
    ///
    /// Single-heuristic engines use the first; multi-heuristic A* uses all.
    /// An empty list means blind search.
    fn heuristics(&self) -> Vec<Box<dyn Heuristic<Self::State>>>;
}

/// Typed failure while constructing a world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The textual or tabular description is malformed.
    #[error("malformed world description: {detail}")]
    Malformed { detail: String },
}

impl WorldError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}
