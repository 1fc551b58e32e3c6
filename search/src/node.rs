//! Search node store: best cost, closed flag and predecessor per state.
//!
//! States live once in an arena addressed by [`NodeId`]; a hash index maps a
//! state back to its id. The predecessor of a node is another node id, never
//! an operator. Plan extraction re-derives operators (see [`crate::plan`]).

use std::collections::HashMap;

/// Arena index of a stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position in insertion order. The initial state is always `0`.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Per-state bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    /// Cheapest known path cost from the initial state.
    pub best_cost: u64,
    /// Expanded. In the default mode a closed node is final.
    pub closed: bool,
    /// `None` only for the initial state.
    pub predecessor: Option<NodeId>,
}

/// Result of [`NodeStore::try_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// First time this state was seen.
    Inserted,
    /// Seen, open (or reopened) and strictly cheaper than before.
    Improved,
    /// Not cheaper, or already closed.
    Rejected,
}

impl UpdateOutcome {
    /// Whether the caller should push a fresh frontier entry.
    #[must_use]
    pub fn accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// The store could not grow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("node store allocation failed at {stored} nodes")]
pub struct CapacityError {
    pub stored: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClosureMode {
    Final,
    Reopen,
}

/// Visited-state store shared by every best-first engine.
#[derive(Debug)]
pub struct NodeStore<S> {
    states: Vec<S>,
    info: Vec<NodeInfo>,
    index: HashMap<S, NodeId>,
    mode: ClosureMode,
    reopened: u64,
}

impl<S: meridian_kernel::model::State> NodeStore<S> {
    /// A store where closed nodes are final.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            info: Vec::new(),
            index: HashMap::new(),
            mode: ClosureMode::Final,
            reopened: 0,
        }
    }

    /// A store that reopens a closed node reached by a strictly cheaper path.
    ///
    /// Depth-first iterations need this: a stack frontier may close a state
    /// through an expensive path before the cheap one is generated.
    #[must_use]
    pub fn with_reopening() -> Self {
        Self {
            mode: ClosureMode::Reopen,
            ..Self::new()
        }
    }

    /// Offer `state` at `cost` via `predecessor`.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] when the arena or index cannot reserve room
    /// for a new state. The store is unchanged in that case.
    pub fn try_update(
        &mut self,
        state: &S,
        cost: u64,
        predecessor: Option<NodeId>,
    ) -> Result<(UpdateOutcome, NodeId), CapacityError> {
        if let Some(&id) = self.index.get(state) {
            let info = &mut self.info[id.0];
            let reopenable = !info.closed || self.mode == ClosureMode::Reopen;
            if reopenable && cost < info.best_cost {
                if info.closed {
                    info.closed = false;
                    self.reopened += 1;
                }
                info.best_cost = cost;
                info.predecessor = predecessor;
                return Ok((UpdateOutcome::Improved, id));
            }
            return Ok((UpdateOutcome::Rejected, id));
        }

        let stored = self.states.len();
        let err = |_| CapacityError { stored };
        self.states.try_reserve(1).map_err(err)?;
        self.info.try_reserve(1).map_err(err)?;
        self.index.try_reserve(1).map_err(err)?;

        let id = NodeId(stored);
        self.states.push(state.clone());
        self.info.push(NodeInfo {
            best_cost: cost,
            closed: false,
            predecessor,
        });
        self.index.insert(state.clone(), id);
        Ok((UpdateOutcome::Inserted, id))
    }

    /// Whether [`NodeStore::try_update`] would reject `state` at `cost`.
    ///
    /// Lets the loop skip heuristic evaluation for successors that cannot
    /// change anything.
    #[must_use]
    pub fn would_reject(&self, state: &S, cost: u64) -> bool {
        self.index.get(state).is_some_and(|id| {
            let info = &self.info[id.0];
            let closed_final = info.closed && self.mode == ClosureMode::Final;
            closed_final || cost >= info.best_cost
        })
    }

    /// Mark `id` expanded. Returns `false` if it already was.
    pub fn close(&mut self, id: NodeId) -> bool {
        let info = &mut self.info[id.0];
        if info.closed {
            return false;
        }
        info.closed = true;
        true
    }

    #[must_use]
    pub fn is_closed(&self, id: NodeId) -> bool {
        self.info[id.0].closed
    }

    #[must_use]
    pub fn state(&self, id: NodeId) -> &S {
        &self.states[id.0]
    }

    #[must_use]
    pub fn info(&self, id: NodeId) -> NodeInfo {
        self.info[id.0]
    }

    #[must_use]
    pub fn best_cost(&self, id: NodeId) -> u64 {
        self.info[id.0].best_cost
    }

    #[must_use]
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.info[id.0].predecessor
    }

    #[must_use]
    pub fn id_of(&self, state: &S) -> Option<NodeId> {
        self.index.get(state).copied()
    }

    /// Number of stored states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Closed nodes reopened by a cheaper path (reopening mode only).
    #[must_use]
    pub fn reopened(&self) -> u64 {
        self.reopened
    }

    /// Node ids from the initial state to `goal`, inclusive.
    ///
    /// Returns `None` if the chain is longer than the store, which can only
    /// happen if predecessors form a cycle.
    #[must_use]
    pub fn path_to(&self, goal: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![goal];
        let mut cursor = goal;
        while let Some(pred) = self.info[cursor.0].predecessor {
            if path.len() > self.states.len() {
                return None;
            }
            path.push(pred);
            cursor = pred;
        }
        path.reverse();
        Some(path)
    }
}

impl<S: meridian_kernel::model::State> Default for NodeStore<S> {
    fn default() -> Self {
        Self::new()
    }
}
