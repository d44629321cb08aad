use std::iter::FusedIterator;
use std::sync::Arc;

use crate::chunk::StringBuffer;
use crate::node::{NodeId, SENTINEL};
use crate::piece::Piece;
use crate::PieceTree;

/// In-order walk over the pieces of a tree.
///
/// Built lazily from an explicit stack, so creating one costs O(log n) and
/// every step is amortized O(1). Call [`PieceTree::pieces`] again to restart.
#[derive(Debug, Clone)]
pub struct Pieces<'a> {
    tree: &'a PieceTree,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a> Pieces<'a> {
    pub(crate) fn new(tree: &'a PieceTree) -> Self {
        let mut pieces = Self {
            tree,
            stack: Vec::new(),
            remaining: tree.piece_count(),
        };
        pieces.push_left_spine(tree.root);
        pieces
    }

    fn push_left_spine(&mut self, mut node: NodeId) {
        while node != SENTINEL {
            self.stack.push(node);
            node = self.tree.left(node);
        }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a Piece;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(self.tree.right(node));
        self.remaining -= 1;
        Some(self.tree.piece(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Pieces<'_> {}

impl FusedIterator for Pieces<'_> {}

/// A frozen copy of a tree's content.
///
/// Holds the piece list and shared handles on the chunks it reads from, so
/// later edits of the tree never show through. Yields the text one piece at a
/// time; an optional BOM comes out first.
#[derive(Debug, Clone)]
pub struct PieceTreeSnapshot {
    pieces: Vec<Piece>,
    chunks: Vec<Arc<StringBuffer>>,
    bom: String,
    cursor: usize,
}

impl PieceTreeSnapshot {
    pub(crate) fn new(tree: &PieceTree) -> Self {
        Self {
            pieces: tree.pieces().copied().collect(),
            chunks: tree.chunks().chunks().to_vec(),
            bom: String::new(),
            cursor: 0,
        }
    }

    /// Prefixes the snapshot's output with `bom`.
    pub fn with_bom(mut self, bom: impl Into<String>) -> Self {
        self.bom = bom.into();
        self
    }

    /// Next block of text, `None` once everything has been read.
    pub fn read(&mut self) -> Option<String> {
        if self.cursor == 0 && !self.bom.is_empty() {
            self.cursor = 1;
            return Some(self.bom.clone());
        }
        if self.cursor == 0 {
            self.cursor = 1;
        }
        let piece = self.pieces.get(self.cursor - 1)?;
        self.cursor += 1;
        Some(self.piece_text(piece).to_string())
    }

    /// The whole captured text, regardless of how much was already read.
    pub fn text(&self) -> String {
        let len = self.pieces.iter().map(Piece::length).sum::<usize>();
        let mut out = String::with_capacity(self.bom.len() + len);
        out.push_str(&self.bom);
        for piece in &self.pieces {
            out.push_str(self.piece_text(piece));
        }
        out
    }

    fn piece_text(&self, piece: &Piece) -> &str {
        let chunk = &self.chunks[piece.chunk_index()];
        &chunk.as_str()[chunk.offset_of(piece.start())..chunk.offset_of(piece.end())]
    }
}

impl Iterator for PieceTreeSnapshot {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.read()
    }
}
