//! Arena-backed Fibonacci heap frontier.
//!
//! Insert is O(1): the entry becomes a new root. Extraction removes the
//! minimum root, promotes its children and consolidates roots of equal
//! degree, giving amortised O(log n). There is no decrease-key: an improved
//! state is inserted again and its stale entry is filtered on pop by the
//! node store, which is exactly the workload where cheap inserts pay off.

use std::collections::TryReserveError;

use super::{Frontier, PriorityKey};

#[derive(Debug)]
struct Slot<V> {
    key: PriorityKey,
    seq: u64,
    /// `None` once the slot has been extracted and sits on the free list.
    value: Option<V>,
    children: Vec<usize>,
}

/// Min-ordered frontier backed by a Fibonacci heap.
///
/// Equal keys pop in insertion order, matching [`super::BinaryHeapFrontier`].
#[derive(Debug)]
pub struct FibonacciHeapFrontier<V> {
    slots: Vec<Slot<V>>,
    free: Vec<usize>,
    roots: Vec<usize>,
    /// Position of the minimum root within `roots`.
    min_pos: Option<usize>,
    len: usize,
    next_seq: u64,
    high_water: u64,
}

impl<V> FibonacciHeapFrontier<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            min_pos: None,
            len: 0,
            next_seq: 0,
            high_water: 0,
        }
    }

    fn precedes(&self, a: usize, b: usize) -> bool {
        let (sa, sb) = (&self.slots[a], &self.slots[b]);
        (sa.key, sa.seq) < (sb.key, sb.seq)
    }

    fn alloc(&mut self, key: PriorityKey, value: V) -> usize {
        let slot = Slot {
            key,
            seq: self.next_seq,
            value: Some(value),
            children: Vec::new(),
        };
        self.next_seq += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = slot;
            idx
        } else {
            self.slots.push(slot);
            self.slots.len() - 1
        }
    }

    /// Link roots of equal degree until every degree is unique, then
    /// recompute the minimum.
    fn consolidate(&mut self) {
        let mut by_degree: Vec<Option<usize>> = Vec::new();
        for root in std::mem::take(&mut self.roots) {
            let mut x = root;
            loop {
                let degree = self.slots[x].children.len();
                if by_degree.len() <= degree {
                    by_degree.resize(degree + 1, None);
                }
                match by_degree[degree].take() {
                    None => {
                        by_degree[degree] = Some(x);
                        break;
                    }
                    Some(mut y) => {
                        if self.precedes(y, x) {
                            std::mem::swap(&mut x, &mut y);
                        }
                        self.slots[x].children.push(y);
                    }
                }
            }
        }
        self.roots = by_degree.into_iter().flatten().collect();
        self.min_pos = self.find_min_pos();
    }

    fn find_min_pos(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (pos, &idx) in self.roots.iter().enumerate() {
            match best {
                Some(b) if !self.precedes(idx, self.roots[b]) => {}
                _ => best = Some(pos),
            }
        }
        best
    }
}

impl<V> Default for FibonacciHeapFrontier<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Frontier<V> for FibonacciHeapFrontier<V> {
    fn insert(&mut self, key: PriorityKey, value: V) {
        let idx = self.alloc(key, value);
        self.roots.push(idx);
        let pos = self.roots.len() - 1;
        match self.min_pos {
            Some(m) if !self.precedes(idx, self.roots[m]) => {}
            _ => self.min_pos = Some(pos),
        }
        self.len += 1;
        let size = self.len as u64;
        if size > self.high_water {
            self.high_water = size;
        }
    }

    fn remove_min(&mut self) -> Option<V> {
        let pos = self.min_pos?;
        let idx = self.roots.swap_remove(pos);
        let children = std::mem::take(&mut self.slots[idx].children);
        self.roots.extend(children);
        let value = self.slots[idx].value.take();
        self.free.push(idx);
        self.len -= 1;
        self.consolidate();
        value
    }

    fn peek_min_key(&self) -> Option<PriorityKey> {
        self.min_pos.map(|pos| self.slots[self.roots[pos]].key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.roots.clear();
        self.min_pos = None;
        self.len = 0;
    }

    fn high_water(&self) -> u64 {
        self.high_water
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let recycled = self.free.len();
        self.slots
            .try_reserve(additional.saturating_sub(recycled))?;
        self.roots.try_reserve(additional)
    }
}
