//! Arena-backed MCTS tree.
//!
//! Nodes own their children through the arena; the parent link is a plain
//! index used for backpropagation and pruning. Removed subtrees return their
//! slots to a free list.

use std::collections::TryReserveError;

/// Arena index of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub(crate) usize);

impl TreeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node of the search tree.
#[derive(Debug, Clone)]
pub struct TreeNode<S, O> {
    pub(crate) parent: Option<TreeId>,
    pub(crate) children: Vec<TreeId>,
    pub(crate) visits: u64,
    pub(crate) score_sum: f64,
    /// Held until the node is expanded; children carry their own states.
    pub(crate) state: Option<S>,
    pub(crate) finished: bool,
    pub(crate) expanded: bool,
    /// Operator leading here from the parent. `None` at the root.
    pub(crate) operator: Option<O>,
    /// Path cost from the root.
    pub(crate) g: u64,
    subtree_size: usize,
}

impl<S, O> TreeNode<S, O> {
    fn new(state: S, operator: Option<O>, g: u64, parent: Option<TreeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            visits: 0,
            score_sum: 0.0,
            state: Some(state),
            finished: false,
            expanded: false,
            operator,
            g,
            subtree_size: 1,
        }
    }

    #[must_use]
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Mean backpropagated score, `None` before the first visit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_score(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.score_sum / self.visits as f64)
    }

    #[must_use]
    pub fn children(&self) -> &[TreeId] {
        &self.children
    }

    #[must_use]
    pub fn parent(&self) -> Option<TreeId> {
        self.parent
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[must_use]
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn operator(&self) -> Option<&O> {
        self.operator.as_ref()
    }

    #[must_use]
    pub fn path_cost(&self) -> u64 {
        self.g
    }
}

/// The MCTS tree.
#[derive(Debug)]
pub struct Tree<S, O> {
    slots: Vec<Option<TreeNode<S, O>>>,
    free: Vec<usize>,
    live: usize,
}

impl<S, O> Tree<S, O> {
    /// A tree holding only `root_state`, at [`Tree::ROOT`].
    #[must_use]
    pub fn new(root_state: S) -> Self {
        Self {
            slots: vec![Some(TreeNode::new(root_state, None, 0, None))],
            free: Vec::new(),
            live: 1,
        }
    }

    pub const ROOT: TreeId = TreeId(0);

    /// Live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// # Panics
    ///
    /// Panics if `id` was removed. Ids handed out by this tree stay valid
    /// until [`Tree::prune`] removes them.
    #[must_use]
    pub fn node(&self, id: TreeId) -> &TreeNode<S, O> {
        self.slots[id.0]
            .as_ref()
            .unwrap_or_else(|| panic!("tree node {} was pruned", id.0))
    }

    pub(crate) fn node_mut(&mut self, id: TreeId) -> &mut TreeNode<S, O> {
        self.slots[id.0]
            .as_mut()
            .unwrap_or_else(|| panic!("tree node {} was pruned", id.0))
    }

    #[must_use]
    pub fn contains(&self, id: TreeId) -> bool {
        self.slots.get(id.0).is_some_and(Option::is_some)
    }

    /// Attach a child holding `state`.
    ///
    /// # Errors
    ///
    /// Propagates allocation failure from the arena or the parent's child
    /// list.
    pub fn add_child(
        &mut self,
        parent: TreeId,
        state: S,
        operator: O,
        g: u64,
    ) -> Result<TreeId, TryReserveError> {
        self.node_mut(parent).children.try_reserve(1)?;
        let node = TreeNode::new(state, Some(operator), g, Some(parent));
        let id = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            TreeId(idx)
        } else {
            self.slots.try_reserve(1)?;
            self.slots.push(Some(node));
            TreeId(self.slots.len() - 1)
        };
        self.node_mut(parent).children.push(id);
        self.live += 1;
        Ok(id)
    }

    /// Detach `id` from its parent and free its whole subtree.
    ///
    /// Returns the parent, or `None` when `id` is the root (which is never
    /// removed).
    pub fn prune(&mut self, id: TreeId) -> Option<TreeId> {
        let parent = self.node(id).parent?;
        self.node_mut(parent).children.retain(|&c| c != id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.slots[next.0].take() {
                stack.extend(node.children);
                self.free.push(next.0);
                self.live -= 1;
            }
        }
        Some(parent)
    }

    /// Ids from the root down to `id`.
    #[must_use]
    pub fn path_from_root(&self, id: TreeId) -> Vec<TreeId> {
        let mut path = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }

    /// Recompute every cached subtree size bottom-up. Returns the root's.
    pub fn recalculate_subtree_sizes(&mut self) -> usize {
        // Slot reuse breaks id order; walk the tree instead.
        let mut order = Vec::with_capacity(self.live);
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().copied());
        }
        for &id in order.iter().rev() {
            let size = 1 + self
                .node(id)
                .children
                .iter()
                .map(|&c| self.node(c).subtree_size)
                .sum::<usize>();
            self.node_mut(id).subtree_size = size;
        }
        self.node(Self::ROOT).subtree_size
    }

    /// Cached size of the subtree rooted at `id`, as of the last
    /// [`Tree::recalculate_subtree_sizes`].
    #[must_use]
    pub fn subtree_size(&self, id: TreeId) -> usize {
        self.node(id).subtree_size
    }

    /// Ids of every live node, root first.
    #[must_use]
    pub fn ids(&self) -> Vec<TreeId> {
        let mut out = Vec::with_capacity(self.live);
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }
}
