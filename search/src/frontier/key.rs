//! Frontier ordering key.

use std::cmp::Ordering;

/// A two-level priority, compared lexicographically with `f64::total_cmp`.
///
/// A* uses `(g + h, h)`: among equal f-values the entry closer to a goal
/// wins. Greedy search uses `(h, g)`.
#[derive(Debug, Clone, Copy)]
pub struct PriorityKey {
    pub primary: f64,
    pub secondary: f64,
}

impl PriorityKey {
    /// A key with no secondary component.
    #[must_use]
    pub fn new(primary: f64) -> Self {
        Self {
            primary,
            secondary: 0.0,
        }
    }

    #[must_use]
    pub fn with_tie_break(primary: f64, secondary: f64) -> Self {
        Self { primary, secondary }
    }
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then(self.secondary.total_cmp(&other.secondary))
    }
}
