use crate::piece::Piece;

/// Index of a node inside the tree's arena.
pub(crate) type NodeId = usize;

/// Slot 0 of every arena: black, empty, and the stand-in for "no node".
pub(crate) const SENTINEL: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeColor {
    Red,
    Black,
}

#[derive(Debug, Clone)]
pub(crate) struct TreeNode {
    pub(crate) piece: Piece,
    pub(crate) color: NodeColor,
    pub(crate) parent: NodeId,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    /// Total length of the left subtree.
    pub(crate) size_left: usize,
    /// Total line feeds of the left subtree.
    pub(crate) lf_left: usize,
    pub(crate) subtree_len: usize,
    pub(crate) subtree_lf: usize,
}

impl TreeNode {
    pub(crate) fn new(piece: Piece) -> Self {
        Self {
            piece,
            color: NodeColor::Red,
            parent: SENTINEL,
            left: SENTINEL,
            right: SENTINEL,
            size_left: 0,
            lf_left: 0,
            subtree_len: piece.length(),
            subtree_lf: piece.line_feed_cnt(),
        }
    }

    pub(crate) fn sentinel() -> Self {
        Self {
            color: NodeColor::Black,
            ..Self::new(Piece::default())
        }
    }
}
