//! Insertion-ordered frontiers: stack and queue.
//!
//! Both ignore the key when choosing what to pop. They record it so
//! `peek_min_key` reports the key of the entry that will come out next.

use std::collections::{TryReserveError, VecDeque};

use super::{Frontier, PriorityKey};

/// Last in, first out.
#[derive(Debug)]
pub struct StackFrontier<V> {
    items: Vec<(PriorityKey, V)>,
    high_water: u64,
}

impl<V> StackFrontier<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            high_water: 0,
        }
    }
}

impl<V> Default for StackFrontier<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Frontier<V> for StackFrontier<V> {
    fn insert(&mut self, key: PriorityKey, value: V) {
        self.items.push((key, value));
        self.high_water = self.high_water.max(self.items.len() as u64);
    }

    fn remove_min(&mut self) -> Option<V> {
        self.items.pop().map(|(_, v)| v)
    }

    fn peek_min_key(&self) -> Option<PriorityKey> {
        self.items.last().map(|(k, _)| *k)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn high_water(&self) -> u64 {
        self.high_water
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.items.try_reserve(additional)
    }
}

/// First in, first out.
#[derive(Debug)]
pub struct QueueFrontier<V> {
    items: VecDeque<(PriorityKey, V)>,
    high_water: u64,
}

impl<V> QueueFrontier<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            high_water: 0,
        }
    }
}

impl<V> Default for QueueFrontier<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Frontier<V> for QueueFrontier<V> {
    fn insert(&mut self, key: PriorityKey, value: V) {
        self.items.push_back((key, value));
        self.high_water = self.high_water.max(self.items.len() as u64);
    }

    fn remove_min(&mut self) -> Option<V> {
        self.items.pop_front().map(|(_, v)| v)
    }

    fn peek_min_key(&self) -> Option<PriorityKey> {
        self.items.front().map(|(k, _)| *k)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn high_water(&self) -> u64 {
        self.high_water
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.items.try_reserve(additional)
    }
}
