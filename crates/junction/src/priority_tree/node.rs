//! Arena node storage for the priority tree.

use std::cmp::Ordering;

/// Handle to a node in a [`PriorityTree`](super::PriorityTree) arena.
///
/// Handles are only meaningful for the tree that issued them and only until
/// the next `clear()` or until the node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The shared sentinel. Every missing child and the root's parent link
    /// point here.
    pub const NIL: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        self == NodeId::NIL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub key: f64,
    /// `None` only for the sentinel and for freed slots.
    pub value: Option<T>,
    pub color: Color,
    pub left: NodeId,
    pub right: NodeId,
    pub parent: NodeId,
}

impl<T> Node<T> {
    pub fn sentinel() -> Self {
        Self {
            key: 0.0,
            value: None,
            color: Color::Black,
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent: NodeId::NIL,
        }
    }

    pub fn new_red(key: f64, value: T) -> Self {
        Self {
            key,
            value: Some(value),
            color: Color::Red,
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent: NodeId::NIL,
        }
    }
}

/// Strict key ordering used for descent. `total_cmp` keeps NaN keys from
/// breaking the search-tree property.
#[inline]
pub(crate) fn key_less(a: f64, b: f64) -> bool {
    a.total_cmp(&b) == Ordering::Less
}
