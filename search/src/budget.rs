//! Wall-clock and node budgets.

use std::time::{Duration, Instant};

use crate::config::SearchConfig;

/// The resource limits of one `solve` call.
///
/// Checked by every engine at fixed points: once per frontier pop and once
/// per generated successor (best-first family), once per iteration and per
/// rollout step (MCTS).
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    started: Instant,
    time_limit: Duration,
    max_nodes: usize,
}

impl Budget {
    /// Start the clock now.
    #[must_use]
    pub fn start(config: &SearchConfig) -> Self {
        Self {
            started: Instant::now(),
            time_limit: config.time_limit,
            max_nodes: config.max_nodes,
        }
    }

    /// Time spent since [`Budget::start`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn time_exceeded(&self) -> bool {
        self.started.elapsed() > self.time_limit
    }

    /// Whether `stored` nodes exceed the ceiling.
    #[must_use]
    pub fn nodes_exceeded(&self, stored: usize) -> bool {
        stored > self.max_nodes
    }
}
