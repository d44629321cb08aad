//! Red-black bookkeeping over the node arena.
//!
//! Every node caches the length and line-feed count of its left subtree
//! (`size_left`, `lf_left`) and of its whole subtree. A rotation only moves
//! the two nodes it pivots, so it refreshes exactly those two (lower one
//! first); the rotated subtree keeps its total, which leaves every ancestor's
//! cache valid. Structural edits refresh the path up to the root.

use crate::PieceTree;
use crate::node::{NodeColor, NodeId, SENTINEL, TreeNode};
use crate::piece::Piece;

impl PieceTree {
    pub(crate) fn left(&self, node: NodeId) -> NodeId {
        self.nodes[node].left
    }

    pub(crate) fn right(&self, node: NodeId) -> NodeId {
        self.nodes[node].right
    }

    pub(crate) fn parent(&self, node: NodeId) -> NodeId {
        self.nodes[node].parent
    }

    fn color(&self, node: NodeId) -> NodeColor {
        self.nodes[node].color
    }

    fn set_color(&mut self, node: NodeId, color: NodeColor) {
        self.nodes[node].color = color;
    }

    pub(crate) fn piece(&self, node: NodeId) -> &Piece {
        &self.nodes[node].piece
    }

    fn alloc(&mut self, piece: Piece) -> NodeId {
        let node = TreeNode::new(piece);
        self.piece_count += 1;
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, node: NodeId) {
        self.nodes[node] = TreeNode::new(Piece::default());
        self.free.push(node);
        self.piece_count -= 1;
    }

    fn update_aggregates(&mut self, node: NodeId) {
        if node == SENTINEL {
            return;
        }
        let (left, right) = (self.left(node), self.right(node));
        let (left_len, left_lf) = (self.nodes[left].subtree_len, self.nodes[left].subtree_lf);
        let (right_len, right_lf) = (self.nodes[right].subtree_len, self.nodes[right].subtree_lf);

        let n = &mut self.nodes[node];
        n.size_left = left_len;
        n.lf_left = left_lf;
        n.subtree_len = left_len + n.piece.length() + right_len;
        n.subtree_lf = left_lf + n.piece.line_feed_cnt() + right_lf;
    }

    pub(crate) fn recompute_upwards(&mut self, mut node: NodeId) {
        while node != SENTINEL {
            self.update_aggregates(node);
            node = self.parent(node);
        }
    }

    /// Replaces the piece held by `node` and refreshes the caches above it.
    pub(crate) fn set_piece(&mut self, node: NodeId, piece: Piece) {
        self.nodes[node].piece = piece;
        self.recompute_upwards(node);
    }

    pub(crate) fn leftmost(&self, mut node: NodeId) -> NodeId {
        while self.left(node) != SENTINEL {
            node = self.left(node);
        }
        node
    }

    pub(crate) fn rightmost(&self, mut node: NodeId) -> NodeId {
        while self.right(node) != SENTINEL {
            node = self.right(node);
        }
        node
    }

    /// In-order successor, `SENTINEL` after the last node.
    pub(crate) fn next(&self, node: NodeId) -> NodeId {
        if self.right(node) != SENTINEL {
            return self.leftmost(self.right(node));
        }
        let mut current = node;
        let mut parent = self.parent(current);
        while parent != SENTINEL && self.right(parent) == current {
            current = parent;
            parent = self.parent(current);
        }
        parent
    }

    pub(crate) fn first_node(&self) -> NodeId {
        if self.root == SENTINEL {
            SENTINEL
        } else {
            self.leftmost(self.root)
        }
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent == SENTINEL {
            self.root = new;
        } else if self.left(parent) == old {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x);
        let y_left = self.left(y);

        self.nodes[x].right = y_left;
        if y_left != SENTINEL {
            self.nodes[y_left].parent = x;
        }
        let parent = self.parent(x);
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, y);
        self.nodes[y].left = x;
        self.nodes[x].parent = y;

        self.update_aggregates(x);
        self.update_aggregates(y);
    }

    fn rotate_right(&mut self, y: NodeId) {
        let x = self.left(y);
        let x_right = self.right(x);

        self.nodes[y].left = x_right;
        if x_right != SENTINEL {
            self.nodes[x_right].parent = y;
        }
        let parent = self.parent(y);
        self.nodes[x].parent = parent;
        self.replace_child(parent, y, x);
        self.nodes[x].right = y;
        self.nodes[y].parent = x;

        self.update_aggregates(y);
        self.update_aggregates(x);
    }

    /// Inserts `piece` as the in-order successor of `node`. With an empty
    /// tree `node` is ignored and the piece becomes the root.
    pub(crate) fn rb_insert_right(&mut self, node: NodeId, piece: Piece) -> NodeId {
        let z = self.alloc(piece);
        if self.root == SENTINEL {
            self.root = z;
        } else if self.right(node) == SENTINEL {
            self.nodes[node].right = z;
            self.nodes[z].parent = node;
        } else {
            let next = self.leftmost(self.right(node));
            self.nodes[next].left = z;
            self.nodes[z].parent = next;
        }
        self.recompute_upwards(z);
        self.fix_insert(z);
        z
    }

    /// Inserts `piece` as the in-order predecessor of `node`.
    pub(crate) fn rb_insert_left(&mut self, node: NodeId, piece: Piece) -> NodeId {
        let z = self.alloc(piece);
        if self.root == SENTINEL {
            self.root = z;
        } else if self.left(node) == SENTINEL {
            self.nodes[node].left = z;
            self.nodes[z].parent = node;
        } else {
            let prev = self.rightmost(self.left(node));
            self.nodes[prev].right = z;
            self.nodes[z].parent = prev;
        }
        self.recompute_upwards(z);
        self.fix_insert(z);
        z
    }

    fn fix_insert(&mut self, mut z: NodeId) {
        while self.color(self.parent(z)) == NodeColor::Red {
            let parent = self.parent(z);
            let grand = self.parent(parent);
            if parent == self.left(grand) {
                let uncle = self.right(grand);
                if self.color(uncle) == NodeColor::Red {
                    self.set_color(parent, NodeColor::Black);
                    self.set_color(uncle, NodeColor::Black);
                    self.set_color(grand, NodeColor::Red);
                    z = grand;
                } else {
                    if z == self.right(parent) {
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.parent(z);
                    let grand = self.parent(parent);
                    self.set_color(parent, NodeColor::Black);
                    self.set_color(grand, NodeColor::Red);
                    self.rotate_right(grand);
                }
            } else {
                let uncle = self.left(grand);
                if self.color(uncle) == NodeColor::Red {
                    self.set_color(parent, NodeColor::Black);
                    self.set_color(uncle, NodeColor::Black);
                    self.set_color(grand, NodeColor::Red);
                    z = grand;
                } else {
                    if z == self.left(parent) {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.parent(z);
                    let grand = self.parent(parent);
                    self.set_color(parent, NodeColor::Black);
                    self.set_color(grand, NodeColor::Red);
                    self.rotate_left(grand);
                }
            }
        }
        let root = self.root;
        self.set_color(root, NodeColor::Black);
    }

    fn transplant(&mut self, old: NodeId, new: NodeId) {
        let parent = self.parent(old);
        self.replace_child(parent, old, new);
        // May write the sentinel's parent; `rb_delete` relies on that.
        self.nodes[new].parent = parent;
    }

    /// Unlinks `z` and frees its slot. Other node ids stay valid: the
    /// successor is relinked into `z`'s place rather than having its piece
    /// copied over.
    pub(crate) fn rb_delete(&mut self, z: NodeId) {
        let mut removed_color = self.color(z);
        let x;

        if self.left(z) == SENTINEL {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z) == SENTINEL {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            let y = self.leftmost(self.right(z));
            removed_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                self.nodes[x].parent = y;
            } else {
                self.transplant(y, x);
                let z_right = self.right(z);
                self.nodes[y].right = z_right;
                self.nodes[z_right].parent = y;
            }
            self.transplant(z, y);
            let z_left = self.left(z);
            self.nodes[y].left = z_left;
            self.nodes[z_left].parent = y;
            self.nodes[y].color = self.color(z);
        }

        self.recompute_upwards(self.parent(x));
        if removed_color == NodeColor::Black {
            self.fix_delete(x);
        }

        self.nodes[SENTINEL] = TreeNode::sentinel();
        self.release(z);
    }

    fn fix_delete(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == NodeColor::Black {
            let parent = self.parent(x);
            if x == self.left(parent) {
                let mut w = self.right(parent);
                if self.color(w) == NodeColor::Red {
                    self.set_color(w, NodeColor::Black);
                    self.set_color(parent, NodeColor::Red);
                    self.rotate_left(parent);
                    w = self.right(parent);
                }
                if self.color(self.left(w)) == NodeColor::Black
                    && self.color(self.right(w)) == NodeColor::Black
                {
                    self.set_color(w, NodeColor::Red);
                    x = parent;
                } else {
                    if self.color(self.right(w)) == NodeColor::Black {
                        let w_left = self.left(w);
                        self.set_color(w_left, NodeColor::Black);
                        self.set_color(w, NodeColor::Red);
                        self.rotate_right(w);
                        w = self.right(parent);
                    }
                    self.set_color(w, self.color(parent));
                    self.set_color(parent, NodeColor::Black);
                    let w_right = self.right(w);
                    self.set_color(w_right, NodeColor::Black);
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut w = self.left(parent);
                if self.color(w) == NodeColor::Red {
                    self.set_color(w, NodeColor::Black);
                    self.set_color(parent, NodeColor::Red);
                    self.rotate_right(parent);
                    w = self.left(parent);
                }
                if self.color(self.right(w)) == NodeColor::Black
                    && self.color(self.left(w)) == NodeColor::Black
                {
                    self.set_color(w, NodeColor::Red);
                    x = parent;
                } else {
                    if self.color(self.left(w)) == NodeColor::Black {
                        let w_right = self.right(w);
                        self.set_color(w_right, NodeColor::Black);
                        self.set_color(w, NodeColor::Red);
                        self.rotate_left(w);
                        w = self.left(parent);
                    }
                    self.set_color(w, self.color(parent));
                    self.set_color(parent, NodeColor::Black);
                    let w_left = self.left(w);
                    self.set_color(w_left, NodeColor::Black);
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }
        self.set_color(x, NodeColor::Black);
    }

    /// Walks the whole tree and panics on any broken red-black rule, parent
    /// link or stale aggregate.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        fn walk(tree: &PieceTree, node: NodeId) -> (usize, usize, usize) {
            if node == SENTINEL {
                return (0, 0, 1);
            }
            let n = &tree.nodes[node];
            for child in [n.left, n.right] {
                if child != SENTINEL {
                    assert_eq!(tree.nodes[child].parent, node, "broken parent link");
                }
            }
            if n.color == NodeColor::Red {
                assert_eq!(tree.color(n.left), NodeColor::Black, "red node with red child");
                assert_eq!(tree.color(n.right), NodeColor::Black, "red node with red child");
            }
            assert!(!n.piece.is_empty(), "empty piece left in tree");

            let (left_len, left_lf, left_bh) = walk(tree, n.left);
            let (right_len, right_lf, right_bh) = walk(tree, n.right);
            assert_eq!(left_bh, right_bh, "black height mismatch");
            assert_eq!(n.size_left, left_len, "stale size_left");
            assert_eq!(n.lf_left, left_lf, "stale lf_left");

            let len = left_len + n.piece.length() + right_len;
            let lf = left_lf + n.piece.line_feed_cnt() + right_lf;
            assert_eq!(n.subtree_len, len, "stale subtree length");
            assert_eq!(n.subtree_lf, lf, "stale subtree line feeds");
            let black = usize::from(n.color == NodeColor::Black);
            (len, lf, left_bh + black)
        }

        if self.root != SENTINEL {
            assert_eq!(self.color(self.root), NodeColor::Black, "red root");
            assert_eq!(self.parent(self.root), SENTINEL, "root with a parent");
        }
        walk(self, self.root);
    }
}
