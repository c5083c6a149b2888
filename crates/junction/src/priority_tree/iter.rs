//! In-order walks over the tree.

use super::node::NodeId;
use super::PriorityTree;

impl<T> PriorityTree<T> {
    fn successor(&self, id: NodeId) -> NodeId {
        if !self.right(id).is_nil() {
            return self.subtree_minimum(self.right(id));
        }
        let mut child = id;
        let mut parent = self.parent(id);
        while !parent.is_nil() && child == self.right(parent) {
            child = parent;
            parent = self.parent(parent);
        }
        parent
    }

    fn predecessor(&self, id: NodeId) -> NodeId {
        if !self.left(id).is_nil() {
            return self.subtree_maximum(self.left(id));
        }
        let mut child = id;
        let mut parent = self.parent(id);
        while !parent.is_nil() && child == self.left(parent) {
            child = parent;
            parent = self.parent(parent);
        }
        parent
    }

    /// Entries from smallest to largest key; ties in insertion order.
    pub fn iter(&self) -> Ascending<'_, T> {
        Ascending {
            tree: self,
            next: self.minimum().unwrap_or(NodeId::NIL),
        }
    }

    /// Entries from largest to smallest key; ties in reverse insertion order,
    /// so the first item is always what [`find_maximum`](Self::find_maximum)
    /// returns.
    pub fn iter_desc(&self) -> Descending<'_, T> {
        Descending {
            tree: self,
            next: self.maximum().unwrap_or(NodeId::NIL),
        }
    }
}

pub struct Ascending<'a, T> {
    tree: &'a PriorityTree<T>,
    next: NodeId,
}

impl<'a, T> Iterator for Ascending<'a, T> {
    type Item = (f64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_nil() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.successor(current);
        self.tree.get(current)
    }
}

pub struct Descending<'a, T> {
    tree: &'a PriorityTree<T>,
    next: NodeId,
}

impl<'a, T> Iterator for Descending<'a, T> {
    type Item = (f64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_nil() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.predecessor(current);
        self.tree.get(current)
    }
}
