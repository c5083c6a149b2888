//! Structural check of the red-black invariants.

use std::fmt;

use super::node::{key_less, Color, NodeId};
use super::PriorityTree;

/// First broken invariant found by [`PriorityTree::verify`].
#[derive(Debug, Clone, PartialEq)]
pub enum TreeViolation {
    /// The sentinel was recolored red.
    SentinelNotBlack,
    /// The root is red.
    RedRoot,
    /// Two consecutive red nodes on a path.
    RedRedEdge { parent: NodeId, child: NodeId },
    /// Two paths below `node` cross different numbers of black nodes.
    BlackHeightMismatch {
        node: NodeId,
        left: usize,
        right: usize,
    },
    /// A key sits on the wrong side of an ancestor.
    OrderViolation { node: NodeId, key: f64 },
    /// A child's parent link does not point back at its parent.
    BrokenParentLink { node: NodeId },
    /// The number of reachable nodes disagrees with `len()`.
    LengthMismatch { counted: usize, recorded: usize },
}

impl fmt::Display for TreeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeViolation::SentinelNotBlack => write!(f, "sentinel is not black"),
            TreeViolation::RedRoot => write!(f, "root is red"),
            TreeViolation::RedRedEdge { parent, child } => {
                write!(f, "red node {parent:?} has red child {child:?}")
            }
            TreeViolation::BlackHeightMismatch { node, left, right } => write!(
                f,
                "black-height differs below {node:?}: left {left}, right {right}"
            ),
            TreeViolation::OrderViolation { node, key } => {
                write!(f, "key {key} at {node:?} is out of search order")
            }
            TreeViolation::BrokenParentLink { node } => {
                write!(f, "parent link of {node:?} is inconsistent")
            }
            TreeViolation::LengthMismatch { counted, recorded } => write!(
                f,
                "reachable node count {counted} does not match recorded length {recorded}"
            ),
        }
    }
}

impl std::error::Error for TreeViolation {}

impl<T> PriorityTree<T> {
    /// Walk the whole tree and check every red-black invariant plus the
    /// parent links. Returns the black-height of the root (sentinel
    /// excluded, the root counted).
    pub fn verify(&self) -> Result<usize, TreeViolation> {
        if self.node(NodeId::NIL).color != Color::Black {
            return Err(TreeViolation::SentinelNotBlack);
        }
        if self.root.is_nil() {
            return if self.len == 0 {
                Ok(0)
            } else {
                Err(TreeViolation::LengthMismatch {
                    counted: 0,
                    recorded: self.len,
                })
            };
        }
        if self.node(self.root).color != Color::Black {
            return Err(TreeViolation::RedRoot);
        }
        if !self.parent(self.root).is_nil() {
            return Err(TreeViolation::BrokenParentLink { node: self.root });
        }

        let mut counted = 0;
        let height = self.verify_subtree(self.root, None, None, &mut counted)?;
        if counted != self.len {
            return Err(TreeViolation::LengthMismatch {
                counted,
                recorded: self.len,
            });
        }
        Ok(height)
    }

    fn verify_subtree(
        &self,
        id: NodeId,
        lower: Option<f64>,
        upper: Option<f64>,
        counted: &mut usize,
    ) -> Result<usize, TreeViolation> {
        if id.is_nil() {
            return Ok(0);
        }
        *counted += 1;

        let node = self.node(id);
        let key = node.key;
        let below_lower = lower.is_some_and(|lo| key_less(key, lo));
        let above_upper = upper.is_some_and(|hi| key_less(hi, key));
        if below_lower || above_upper {
            return Err(TreeViolation::OrderViolation { node: id, key });
        }

        for child in [node.left, node.right] {
            if child.is_nil() {
                continue;
            }
            if self.parent(child) != id {
                return Err(TreeViolation::BrokenParentLink { node: child });
            }
            if node.color == Color::Red && self.node(child).color == Color::Red {
                return Err(TreeViolation::RedRedEdge { parent: id, child });
            }
        }

        let left = self.verify_subtree(node.left, lower, Some(key), counted)?;
        let right = self.verify_subtree(node.right, Some(key), upper, counted)?;
        if left != right {
            return Err(TreeViolation::BlackHeightMismatch {
                node: id,
                left,
                right,
            });
        }

        Ok(left + usize::from(node.color == Color::Black))
    }
}
