//! Binary-heap frontier.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, TryReserveError};

use super::{Frontier, PriorityKey};

/// A frontier entry wrapping a value with its ordering key.
///
/// `BinaryHeap` is a max-heap, so we use `Reverse<(key, seq)>` to get
/// min-heap behavior (lowest key first, then lowest insertion sequence).
#[derive(Debug)]
struct FrontierEntry<V> {
    key: Reverse<(PriorityKey, u64)>,
    value: V,
}

impl<V> PartialEq for FrontierEntry<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<V> Eq for FrontierEntry<V> {}

impl<V> PartialOrd for FrontierEntry<V> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<V> Ord for FrontierEntry<V> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// Min-ordered frontier on `std::collections::BinaryHeap`.
///
/// O(log n) insert and remove. Equal keys pop in insertion order.
#[derive(Debug)]
pub struct BinaryHeapFrontier<V> {
    heap: BinaryHeap<FrontierEntry<V>>,
    next_seq: u64,
    high_water: u64,
}

impl<V> BinaryHeapFrontier<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            high_water: 0,
        }
    }
}

impl<V> Default for BinaryHeapFrontier<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Frontier<V> for BinaryHeapFrontier<V> {
    fn insert(&mut self, key: PriorityKey, value: V) {
        self.heap.push(FrontierEntry {
            key: Reverse((key, self.next_seq)),
            value,
        });
        self.next_seq += 1;
        let size = self.heap.len() as u64;
        if size > self.high_water {
            self.high_water = size;
        }
    }

    fn remove_min(&mut self) -> Option<V> {
        self.heap.pop().map(|e| e.value)
    }

    fn peek_min_key(&self) -> Option<PriorityKey> {
        self.heap.peek().map(|e| e.key.0 .0)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.heap.clear();
    }

    fn high_water(&self) -> u64 {
        self.high_water
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.heap.try_reserve(additional)
    }
}
