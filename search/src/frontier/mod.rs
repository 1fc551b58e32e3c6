//! Keyed min-priority open lists.
//!
//! Every implementation satisfies the same [`Frontier`] contract so the
//! best-first loop can swap them freely:
//!
//! | kind | order | used by |
//! |---|---|---|
//! | [`BinaryHeapFrontier`] | lowest key, then oldest | A*, greedy, beam |
//! | [`FibonacciHeapFrontier`] | lowest key, then oldest | A* on duplicate-heavy problems |
//! | [`StackFrontier`] | newest first | IDA* iterations |
//! | [`QueueFrontier`] | oldest first | breadth-first |
//!
//! Frontiers never deduplicate. Several stale entries for the same state may
//! coexist; the node store's closed flag filters them on pop.

mod binary_heap;
mod fibonacci;
mod key;
mod sequential;

use std::collections::TryReserveError;
use std::str::FromStr;

pub use binary_heap::BinaryHeapFrontier;
pub use fibonacci::FibonacciHeapFrontier;
pub use key::PriorityKey;
pub use sequential::{QueueFrontier, StackFrontier};

use crate::error::SearchError;

/// The open-list contract.
pub trait Frontier<V> {
    /// Insert `value` with priority `key`.
    fn insert(&mut self, key: PriorityKey, value: V);

    /// Remove the entry this frontier ranks first.
    ///
    /// Calling this on an empty frontier is a precondition violation; callers
    /// check [`Frontier::is_empty`] first. `None` is returned in that case.
    fn remove_min(&mut self) -> Option<V>;

    /// Key of the entry [`Frontier::remove_min`] would return next.
    fn peek_min_key(&self) -> Option<PriorityKey>;

    /// Current number of entries, stale ones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. The high-water mark is kept.
    fn clear(&mut self);

    /// Largest size ever reached.
    fn high_water(&self) -> u64;

    /// Reserve room for `additional` inserts without aborting on failure.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's [`TryReserveError`].
    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError>;
}

/// Selects a [`Frontier`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontierKind {
    BinaryHeap,
    FibonacciHeap,
    Stack,
    Queue,
}

impl FrontierKind {
    pub const ALL: [FrontierKind; 4] = [
        FrontierKind::BinaryHeap,
        FrontierKind::FibonacciHeap,
        FrontierKind::Stack,
        FrontierKind::Queue,
    ];

    /// Build an empty frontier of this kind.
    #[must_use]
    pub fn build<V: 'static>(self) -> Box<dyn Frontier<V>> {
        match self {
            Self::BinaryHeap => Box::new(BinaryHeapFrontier::new()),
            Self::FibonacciHeap => Box::new(FibonacciHeapFrontier::new()),
            Self::Stack => Box::new(StackFrontier::new()),
            Self::Queue => Box::new(QueueFrontier::new()),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BinaryHeap => "binary_heap",
            Self::FibonacciHeap => "fibonacci_heap",
            Self::Stack => "stack",
            Self::Queue => "queue",
        }
    }
}

impl FromStr for FrontierKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SearchError::invalid_config(format!("unknown frontier kind `{s}`")))
    }
}

impl std::fmt::Display for FrontierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
