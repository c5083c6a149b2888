//! Red-black tree keyed by priority score.
//!
//! The scheduler rebuilds this tree from scratch every cycle (`clear` followed
//! by one `insert` per lane) and reads the maximum. The tree is a general
//! ordered multiset, so it also supports deletion, minimum lookup and ordered
//! iteration.
//!
//! ## Storage
//! Nodes live in an arena (`Vec<Node<T>>`) addressed by [`NodeId`]. Slot 0 is
//! the sentinel: a single black node that every leaf link and the root's
//! parent link point to, so color and parent reads never special-case a
//! missing node. Deleted slots go on a free list and are reused by later
//! inserts. `clear` truncates the arena back to the sentinel and keeps its
//! capacity, so a per-cycle rebuild does not reallocate.
//!
//! ## Ties
//! Descent sends strictly smaller keys left and everything else right, so an
//! equal key always lands after the existing equal keys in in-order position.
//! Rotations preserve in-order sequence, therefore ties keep insertion order
//! and [`PriorityTree::find_maximum`] returns the most recently inserted of
//! the nodes sharing the largest key.

mod iter;
mod node;
mod rebalance;
mod verify;

pub use iter::{Ascending, Descending};
pub use node::{Color, NodeId};
pub use verify::TreeViolation;

use node::{key_less, Node};

/// Ordered multiset of `(score, value)` pairs backed by a red-black tree.
#[derive(Debug, Clone)]
pub struct PriorityTree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
    free: Vec<NodeId>,
    len: usize,
}

impl<T> Default for PriorityTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityTree<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty tree with room for `capacity` nodes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node::sentinel());
        Self {
            nodes,
            root: NodeId::NIL,
            free: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Reset to the empty state. Every previously issued [`NodeId`] becomes
    /// invalid.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0] = Node::sentinel();
        self.free.clear();
        self.root = NodeId::NIL;
        self.len = 0;
    }

    /// Insert `value` under `key` and return the handle of the new node.
    pub fn insert(&mut self, key: f64, value: T) -> NodeId {
        let z = self.alloc(key, value);

        let mut parent = NodeId::NIL;
        let mut current = self.root;
        while !current.is_nil() {
            parent = current;
            current = if key_less(key, self.key_of(current)) {
                self.left(current)
            } else {
                self.right(current)
            };
        }

        self.node_mut(z).parent = parent;
        if parent.is_nil() {
            self.root = z;
        } else if key_less(key, self.key_of(parent)) {
            self.node_mut(parent).left = z;
        } else {
            self.node_mut(parent).right = z;
        }

        self.insert_fixup(z);
        self.len += 1;
        z
    }

    /// Value bound to the largest key, or `None` when empty.
    pub fn find_maximum(&self) -> Option<&T> {
        self.maximum().and_then(|id| self.value(id))
    }

    /// Value bound to the smallest key, or `None` when empty.
    pub fn find_minimum(&self) -> Option<&T> {
        self.minimum().and_then(|id| self.value(id))
    }

    /// Handle of the rightmost node.
    pub fn maximum(&self) -> Option<NodeId> {
        if self.root.is_nil() {
            return None;
        }
        Some(self.subtree_maximum(self.root))
    }

    /// Handle of the leftmost node.
    pub fn minimum(&self) -> Option<NodeId> {
        if self.root.is_nil() {
            return None;
        }
        Some(self.subtree_minimum(self.root))
    }

    /// Key and value of a live node.
    pub fn get(&self, id: NodeId) -> Option<(f64, &T)> {
        if !self.is_live(id) {
            return None;
        }
        let node = self.node(id);
        node.value.as_ref().map(|v| (node.key, v))
    }

    #[inline]
    pub fn key(&self, id: NodeId) -> Option<f64> {
        self.get(id).map(|(k, _)| k)
    }

    #[inline]
    pub fn value(&self, id: NodeId) -> Option<&T> {
        self.get(id).map(|(_, v)| v)
    }

    /// Color of a node; the sentinel reports black.
    pub fn color(&self, id: NodeId) -> Option<Color> {
        if id.is_nil() || self.is_live(id) {
            Some(self.node(id).color)
        } else {
            None
        }
    }

    /// Remove a node and return its key and value.
    ///
    /// When the node has two children its in-order successor is spliced into
    /// its position. Returns `None` for the sentinel and for stale handles.
    pub fn delete(&mut self, id: NodeId) -> Option<(f64, T)> {
        if !self.is_live(id) {
            return None;
        }

        let z = id;
        let mut spliced_color = self.node(z).color;
        let x;

        if self.left(z).is_nil() {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z).is_nil() {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            let y = self.subtree_minimum(self.right(z));
            spliced_color = self.node(y).color;
            x = self.right(y);

            if self.parent(y) == z {
                // x may be the sentinel; the fix-up walks up from its parent.
                self.node_mut(x).parent = y;
            } else {
                self.transplant(y, x);
                let zr = self.right(z);
                self.node_mut(y).right = zr;
                self.node_mut(zr).parent = y;
            }

            self.transplant(z, y);
            let zl = self.left(z);
            self.node_mut(y).left = zl;
            self.node_mut(zl).parent = y;
            let z_color = self.node(z).color;
            self.node_mut(y).color = z_color;
        }

        if spliced_color == Color::Black {
            self.delete_fixup(x);
        }
        self.nodes[0].parent = NodeId::NIL;

        self.len -= 1;
        self.release(z)
    }

    /// Remove the node holding the largest key.
    pub fn pop_maximum(&mut self) -> Option<(f64, T)> {
        let id = self.maximum()?;
        self.delete(id)
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack = Vec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            best = best.max(depth);
            for child in [self.left(id), self.right(id)] {
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }
        best
    }

    // -----------------------------------------------------------------------
    // Arena plumbing
    // -----------------------------------------------------------------------

    fn alloc(&mut self, key: f64, value: T) -> NodeId {
        let node = Node::new_red(key, value);
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            id
        } else {
            self.nodes.push(node);
            NodeId::from_index(self.nodes.len() - 1)
        }
    }

    fn release(&mut self, id: NodeId) -> Option<(f64, T)> {
        let node = &mut self.nodes[id.index()];
        let key = node.key;
        let value = node.value.take();
        node.left = NodeId::NIL;
        node.right = NodeId::NIL;
        node.parent = NodeId::NIL;
        node.color = Color::Black;
        self.free.push(id);
        value.map(|v| (key, v))
    }

    #[inline]
    fn is_live(&self, id: NodeId) -> bool {
        !id.is_nil() && id.index() < self.nodes.len() && self.nodes[id.index()].value.is_some()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn left(&self, id: NodeId) -> NodeId {
        self.node(id).left
    }

    #[inline]
    pub(crate) fn right(&self, id: NodeId) -> NodeId {
        self.node(id).right
    }

    #[inline]
    pub(crate) fn parent(&self, id: NodeId) -> NodeId {
        self.node(id).parent
    }

    #[inline]
    pub(crate) fn key_of(&self, id: NodeId) -> f64 {
        self.node(id).key
    }

    pub(crate) fn subtree_minimum(&self, mut id: NodeId) -> NodeId {
        while !self.left(id).is_nil() {
            id = self.left(id);
        }
        id
    }

    pub(crate) fn subtree_maximum(&self, mut id: NodeId) -> NodeId {
        while !self.right(id).is_nil() {
            id = self.right(id);
        }
        id
    }
}
