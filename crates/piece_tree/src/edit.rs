//! Insertion and deletion.

use tracing::{debug, trace};

use crate::chunk::{split_text, BufferCursor};
use crate::error::PieceTreeError;
use crate::node::{NodeId, SENTINEL};
use crate::piece::Piece;
use crate::PieceTree;

impl PieceTree {
    /// Inserts `text` at byte `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), PieceTreeError> {
        self.check_offset(offset)?;
        if text.is_empty() {
            return Ok(());
        }
        trace!(offset, len = text.len(), "insert");

        let pieces = self.create_pieces(text);
        let Some(hit) = self.node_at(offset) else {
            let mut last = SENTINEL;
            for piece in pieces {
                last = self.rb_insert_right(last, piece);
            }
            return Ok(());
        };

        let piece = *self.piece(hit.node);
        if hit.remainder == 0 {
            let mut anchor = hit.node;
            for piece in pieces.into_iter().rev() {
                anchor = self.rb_insert_left(anchor, piece);
            }
        } else {
            if hit.remainder < piece.length() {
                let cut = self.cursor_in_piece(&piece, hit.remainder);
                let left = self.make_piece(piece.chunk_index(), piece.start(), cut);
                let right = self.make_piece(piece.chunk_index(), cut, piece.end());
                self.set_piece(hit.node, left);
                self.rb_insert_right(hit.node, right);
            }
            let mut anchor = hit.node;
            for piece in pieces {
                anchor = self.rb_insert_right(anchor, piece);
            }
        }

        self.fix_crlf_at(offset);
        self.fix_crlf_at(offset + text.len());
        Ok(())
    }

    /// Removes `count` bytes starting at `offset`.
    pub fn delete(&mut self, offset: usize, count: usize) -> Result<(), PieceTreeError> {
        let end = offset.checked_add(count).ok_or(PieceTreeError::RangeOutOfBounds {
            start: offset,
            end: usize::MAX,
            len: self.len(),
        })?;
        self.check_range(offset, end)?;
        if count == 0 {
            return Ok(());
        }
        trace!(offset, count, "delete");

        let (Some(first), Some(last)) = (self.node_containing(offset), self.node_at(end)) else {
            return Ok(());
        };

        if first.node == last.node {
            let node = first.node;
            let piece = *self.piece(node);
            let (from, to) = (first.remainder, last.remainder);
            if from == 0 && to == piece.length() {
                self.rb_delete(node);
            } else if from == 0 {
                let start = self.cursor_in_piece(&piece, to);
                let head_trimmed = self.make_piece(piece.chunk_index(), start, piece.end());
                self.set_piece(node, head_trimmed);
            } else if to == piece.length() {
                let end = self.cursor_in_piece(&piece, from);
                let tail_trimmed = self.make_piece(piece.chunk_index(), piece.start(), end);
                self.set_piece(node, tail_trimmed);
            } else {
                let cut_start = self.cursor_in_piece(&piece, from);
                let cut_end = self.cursor_in_piece(&piece, to);
                let left = self.make_piece(piece.chunk_index(), piece.start(), cut_start);
                let right = self.make_piece(piece.chunk_index(), cut_end, piece.end());
                self.set_piece(node, left);
                self.rb_insert_right(node, right);
            }
        } else {
            let mut doomed: Vec<NodeId> = Vec::new();
            let mut node = self.next(first.node);
            while node != last.node && node != SENTINEL {
                doomed.push(node);
                node = self.next(node);
            }

            let last_piece = *self.piece(last.node);
            if last.remainder == last_piece.length() {
                doomed.push(last.node);
            } else {
                let start = self.cursor_in_piece(&last_piece, last.remainder);
                let trimmed = self.make_piece(last_piece.chunk_index(), start, last_piece.end());
                self.set_piece(last.node, trimmed);
            }

            let first_piece = *self.piece(first.node);
            if first.remainder == 0 {
                doomed.push(first.node);
            } else {
                let end = self.cursor_in_piece(&first_piece, first.remainder);
                let trimmed = self.make_piece(first_piece.chunk_index(), first_piece.start(), end);
                self.set_piece(first.node, trimmed);
            }

            for node in doomed {
                self.rb_delete(node);
            }
        }

        self.fix_crlf_at(offset);
        Ok(())
    }

    pub(crate) fn make_piece(&self, chunk_index: usize, start: BufferCursor, end: BufferCursor) -> Piece {
        Piece::new(self.chunks.chunk(chunk_index), chunk_index, start, end)
    }

    /// Appends `text` to the change chunk and returns the pieces covering it.
    pub(crate) fn create_pieces(&mut self, text: &str) -> Vec<Piece> {
        split_text(text, self.options.chunk_size)
            .into_iter()
            .map(|part| self.append_change(part))
            .collect()
    }

    fn append_change(&mut self, text: &str) -> Piece {
        let (index, range) = self.chunks.append_change(text, self.options.chunk_size);
        let chunk = self.chunks.chunk(index);
        Piece::new(chunk, index, chunk.cursor_at(range.start), chunk.cursor_at(range.end))
    }

    /// Joins a `\r` | `\n` pair split across the pieces that meet at
    /// `offset`: both sides give up a byte and a dedicated `"\r\n"` piece is
    /// put between them.
    pub(crate) fn fix_crlf_at(&mut self, offset: usize) {
        if offset == 0 || offset >= self.len() {
            return;
        }
        let Some(hit) = self.node_at(offset) else {
            return;
        };
        let left = *self.piece(hit.node);
        if hit.remainder != left.length() {
            return;
        }
        let right_node = self.next(hit.node);
        if right_node == SENTINEL {
            return;
        }
        let right = *self.piece(right_node);
        if !(self.piece_text(&left).ends_with('\r') && self.piece_text(&right).starts_with('\n')) {
            return;
        }
        debug!(offset, "coalescing split CRLF");

        if left.length() == 1 {
            self.rb_delete(hit.node);
        } else {
            let end = self.cursor_in_piece(&left, left.length() - 1);
            let shrunk = self.make_piece(left.chunk_index(), left.start(), end);
            self.set_piece(hit.node, shrunk);
        }
        // Node ids survive `rb_delete`, so `right_node` is still valid.
        if right.length() == 1 {
            self.rb_delete(right_node);
        } else {
            let start = self.cursor_in_piece(&right, 1);
            let shrunk = self.make_piece(right.chunk_index(), start, right.end());
            self.set_piece(right_node, shrunk);
        }

        let crlf = self.append_change("\r\n");
        self.insert_piece_at(offset - 1, crlf);
    }

    /// Inserts one piece at a piece boundary.
    fn insert_piece_at(&mut self, offset: usize, piece: Piece) {
        if offset == 0 {
            let first = self.first_node();
            self.rb_insert_left(first, piece);
            return;
        }
        match self.node_at(offset) {
            Some(hit) => {
                debug_assert_eq!(hit.remainder, self.piece(hit.node).length());
                self.rb_insert_right(hit.node, piece);
            }
            None => {
                self.rb_insert_right(SENTINEL, piece);
            }
        }
    }
}
