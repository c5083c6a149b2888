//! Rotations and the insert/delete fix-ups.

use super::node::{Color, NodeId};
use super::PriorityTree;

impl<T> PriorityTree<T> {
    #[inline]
    fn is_red(&self, id: NodeId) -> bool {
        self.node(id).color == Color::Red
    }

    #[inline]
    fn set_color(&mut self, id: NodeId, color: Color) {
        // The sentinel stays black whatever the fix-ups ask for.
        if !id.is_nil() {
            self.node_mut(id).color = color;
        }
    }

    /// Replace `x`'s link in its parent (or the root) with `y`.
    fn replace_child(&mut self, x: NodeId, y: NodeId) {
        let xp = self.parent(x);
        if xp.is_nil() {
            self.root = y;
        } else if x == self.left(xp) {
            self.node_mut(xp).left = y;
        } else {
            self.node_mut(xp).right = y;
        }
    }

    /// Rotate `x` down to the left; its right child takes its place.
    pub(super) fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x);
        debug_assert!(!y.is_nil(), "rotate_left needs a right child");

        let beta = self.left(y);
        self.node_mut(x).right = beta;
        if !beta.is_nil() {
            self.node_mut(beta).parent = x;
        }

        let xp = self.parent(x);
        self.node_mut(y).parent = xp;
        self.replace_child(x, y);

        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
    }

    /// Rotate `y` down to the right; its left child takes its place.
    pub(super) fn rotate_right(&mut self, y: NodeId) {
        let x = self.left(y);
        debug_assert!(!x.is_nil(), "rotate_right needs a left child");

        let beta = self.right(x);
        self.node_mut(y).left = beta;
        if !beta.is_nil() {
            self.node_mut(beta).parent = y;
        }

        let yp = self.parent(y);
        self.node_mut(x).parent = yp;
        self.replace_child(y, x);

        self.node_mut(x).right = y;
        self.node_mut(y).parent = x;
    }

    /// Hang `v` where `u` was. `v` may be the sentinel, in which case its
    /// parent link is written so the delete fix-up can climb from it.
    pub(super) fn transplant(&mut self, u: NodeId, v: NodeId) {
        self.replace_child(u, v);
        let up = self.parent(u);
        self.node_mut(v).parent = up;
    }

    pub(super) fn insert_fixup(&mut self, mut z: NodeId) {
        while self.is_red(self.parent(z)) {
            let p = self.parent(z);
            let g = self.parent(p);

            if p == self.left(g) {
                let uncle = self.right(g);
                if self.is_red(uncle) {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.right(p) {
                        // inner child: straighten the path first
                        z = p;
                        self.rotate_left(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.left(g);
                if self.is_red(uncle) {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Restore equal black-height after a black node left the path through `x`.
    pub(super) fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && !self.is_red(x) {
            let p = self.parent(x);

            if x == self.left(p) {
                let mut w = self.right(p);
                if self.is_red(w) {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = self.right(self.parent(x));
                }

                if !self.is_red(self.left(w)) && !self.is_red(self.right(w)) {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if !self.is_red(self.right(w)) {
                        let wl = self.left(w);
                        self.set_color(wl, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(self.parent(x));
                    }
                    let p = self.parent(x);
                    let p_color = self.node(p).color;
                    self.set_color(w, p_color);
                    self.set_color(p, Color::Black);
                    let wr = self.right(w);
                    self.set_color(wr, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.is_red(w) {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = self.left(self.parent(x));
                }

                if !self.is_red(self.right(w)) && !self.is_red(self.left(w)) {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if !self.is_red(self.left(w)) {
                        let wr = self.right(w);
                        self.set_color(wr, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(self.parent(x));
                    }
                    let p = self.parent(x);
                    let p_color = self.node(p).color;
                    self.set_color(w, p_color);
                    self.set_color(p, Color::Black);
                    let wl = self.left(w);
                    self.set_color(wl, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
    }
}
