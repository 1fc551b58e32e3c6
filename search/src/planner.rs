//! The common engine interface.

use meridian_kernel::model::Problem;

use crate::error::SearchError;
use crate::outcome::{SearchOutcome, SearchStatus};

/// A search engine over problems of type `P`.
///
/// Engines are single-threaded and own every structure they build during
/// [`Planner::solve`]. Calling `solve` again starts a fresh run.
pub trait Planner<P: Problem> {
    /// Short identifier used in traces and reports.
    fn name(&self) -> &'static str;

    /// Status of the most recent run.
    fn status(&self) -> SearchStatus;

    /// Search from the problem's initial state.
    ///
    /// Budget exhaustion and unsolvability are reported through
    /// [`SearchOutcome::status`], never as errors.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] before any search step when the
    /// configuration is rejected, and [`SearchError::BrokenPredecessorChain`]
    /// when the model's successor generation is not deterministic enough to
    /// rebuild the plan.
    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError>;
}

impl<P: Problem, T: Planner<P> + ?Sized> Planner<P> for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn status(&self) -> SearchStatus {
        (**self).status()
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        (**self).solve(problem)
    }
}
