//! Read-only descents: offset and line addressing plus text extraction.

use crate::chunk::BufferCursor;
use crate::error::PieceTreeError;
use crate::node::{NodeId, SENTINEL};
use crate::piece::Piece;
use crate::position::Position;
use crate::PieceTree;

/// Result of locating a document offset inside a piece.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeHit {
    pub(crate) node: NodeId,
    /// Offset relative to the start of the node's piece.
    pub(crate) remainder: usize,
    /// Document offset at which the piece starts.
    pub(crate) piece_start: usize,
}

impl PieceTree {
    /// Finds the piece holding `offset`. On a boundary between two pieces
    /// the one on the left wins, so `remainder` is only 0 at offset 0.
    pub(crate) fn node_at(&self, mut offset: usize) -> Option<NodeHit> {
        let mut x = self.root;
        let mut base = 0;
        while x != SENTINEL {
            let n = &self.nodes[x];
            let piece_len = n.piece.length();
            if n.left != SENTINEL && offset <= n.size_left {
                x = n.left;
            } else if offset <= n.size_left + piece_len {
                return Some(NodeHit {
                    node: x,
                    remainder: offset - n.size_left,
                    piece_start: base + n.size_left,
                });
            } else {
                offset -= n.size_left + piece_len;
                base += n.size_left + piece_len;
                x = n.right;
            }
        }
        None
    }

    /// Finds the piece whose `[start, end)` range holds `offset`.
    pub(crate) fn node_containing(&self, mut offset: usize) -> Option<NodeHit> {
        let mut x = self.root;
        let mut base = 0;
        while x != SENTINEL {
            let n = &self.nodes[x];
            let piece_len = n.piece.length();
            if offset < n.size_left {
                x = n.left;
            } else if offset < n.size_left + piece_len {
                return Some(NodeHit {
                    node: x,
                    remainder: offset - n.size_left,
                    piece_start: base + n.size_left,
                });
            } else {
                offset -= n.size_left + piece_len;
                base += n.size_left + piece_len;
                x = n.right;
            }
        }
        None
    }

    /// Chunk cursor `remainder` bytes into `piece`.
    pub(crate) fn cursor_in_piece(&self, piece: &Piece, remainder: usize) -> BufferCursor {
        let chunk = self.chunks.chunk(piece.chunk_index());
        chunk.cursor_at(chunk.offset_of(piece.start()) + remainder)
    }

    pub(crate) fn piece_text(&self, piece: &Piece) -> &str {
        self.chunks.piece_text(piece)
    }

    pub(crate) fn check_offset(&self, offset: usize) -> Result<(), PieceTreeError> {
        let len = self.len();
        if offset > len {
            return Err(PieceTreeError::OffsetOutOfBounds { offset, len });
        }
        // Pieces are always cut on character boundaries, so only offsets
        // strictly inside a piece need a look at the chunk.
        if let Some(hit) = self.node_containing(offset)
            && hit.remainder > 0
        {
            let piece = self.piece(hit.node);
            let chunk = self.chunks.chunk(piece.chunk_index());
            let chunk_offset = chunk.offset_of(piece.start()) + hit.remainder;
            if !chunk.as_str().is_char_boundary(chunk_offset) {
                return Err(PieceTreeError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }

    pub(crate) fn check_range(&self, start: usize, end: usize) -> Result<(), PieceTreeError> {
        let len = self.len();
        if start > end || end > len {
            return Err(PieceTreeError::RangeOutOfBounds { start, end, len });
        }
        self.check_offset(start)?;
        self.check_offset(end)
    }

    fn check_line(&self, line: usize) -> Result<(), PieceTreeError> {
        let line_count = self.line_count();
        if line == 0 || line > line_count {
            return Err(PieceTreeError::LineOutOfBounds { line, line_count });
        }
        Ok(())
    }

    /// Line breaks that end before `offset`. An offset between the `\r` and
    /// the `\n` of a pair does not count that pair.
    fn line_feeds_before(&self, mut offset: usize) -> usize {
        let mut x = self.root;
        let mut line_feeds = 0;
        while x != SENTINEL {
            let n = &self.nodes[x];
            let piece = &n.piece;
            if n.left != SENTINEL && offset <= n.size_left {
                x = n.left;
            } else if offset <= n.size_left + piece.length() {
                let remainder = offset - n.size_left;
                if remainder == piece.length() {
                    return line_feeds + n.lf_left + piece.line_feed_cnt();
                }
                let cursor = self.cursor_in_piece(piece, remainder);
                return line_feeds + n.lf_left + cursor.line - piece.start().line;
            } else {
                offset -= n.size_left + piece.length();
                line_feeds += n.lf_left + piece.line_feed_cnt();
                x = n.right;
            }
        }
        line_feeds
    }

    /// Document offset of the first byte of `line` (1-based, already
    /// validated).
    pub(crate) fn line_start_offset(&self, line: usize) -> usize {
        let mut k = line - 1;
        if k == 0 {
            return 0;
        }
        let mut x = self.root;
        let mut base = 0;
        while x != SENTINEL {
            let n = &self.nodes[x];
            let piece = &n.piece;
            if k <= n.lf_left {
                x = n.left;
            } else if k <= n.lf_left + piece.line_feed_cnt() {
                let chunk = self.chunks.chunk(piece.chunk_index());
                let index = piece.start().line + k - n.lf_left;
                // Past `end.line` only when the piece stops inside a `\r\n`,
                // where the next line starts at the piece end.
                let within = if index > piece.end().line {
                    piece.length()
                } else {
                    chunk.line_starts()[index] - chunk.offset_of(piece.start())
                };
                return base + n.size_left + within;
            } else {
                k -= n.lf_left + piece.line_feed_cnt();
                base += n.size_left + piece.length();
                x = n.right;
            }
        }
        self.len()
    }

    /// Offset one past the last content byte of `line`, i.e. where its line
    /// break (if any) starts.
    fn line_content_end(&self, line: usize) -> usize {
        if line == self.line_count() {
            return self.len();
        }
        let next = self.line_start_offset(line + 1);
        let start = self.line_start_offset(line);
        let mut end = next;
        if end > start && self.byte_before(end) == Some(b'\n') {
            end -= 1;
        }
        if end > start && self.byte_before(end) == Some(b'\r') {
            end -= 1;
        }
        end
    }

    fn byte_before(&self, offset: usize) -> Option<u8> {
        if offset == 0 {
            return None;
        }
        let hit = self.node_at(offset)?;
        let piece = self.piece(hit.node);
        let chunk = self.chunks.chunk(piece.chunk_index());
        chunk.byte_at(chunk.offset_of(piece.start()) + hit.remainder - 1)
    }

    pub fn get_offset_at(&self, position: Position) -> Result<usize, PieceTreeError> {
        self.check_line(position.line)?;
        let start = self.line_start_offset(position.line);
        // The last valid column of a line sits just before its final break
        // byte, which keeps the spot inside a `\r\n` addressable.
        let span_end = if position.line == self.line_count() {
            self.len()
        } else {
            self.line_start_offset(position.line + 1) - 1
        };
        let max_column = span_end - start + 1;
        if position.column == 0 || position.column > max_column {
            return Err(PieceTreeError::ColumnOutOfBounds {
                line: position.line,
                column: position.column,
                max_column,
            });
        }
        let offset = start + position.column - 1;
        self.check_offset(offset)?;
        Ok(offset)
    }

    pub fn get_position_at(&self, offset: usize) -> Result<Position, PieceTreeError> {
        self.check_offset(offset)?;
        let line = self.line_feeds_before(offset) + 1;
        let column = offset - self.line_start_offset(line) + 1;
        Ok(Position::new(line, column))
    }

    /// Text of `start..end`.
    pub fn get_value_in_range(&self, start: usize, end: usize) -> Result<String, PieceTreeError> {
        self.check_range(start, end)?;
        Ok(self.collect_range(start, end))
    }

    pub(crate) fn collect_range(&self, start: usize, end: usize) -> String {
        let mut out = String::with_capacity(end - start);
        let Some(hit) = self.node_containing(start) else {
            return out;
        };
        let mut node = hit.node;
        let mut skip = hit.remainder;
        let mut remaining = end - start;
        while remaining > 0 && node != SENTINEL {
            let text = &self.piece_text(self.piece(node))[skip..];
            let take = remaining.min(text.len());
            out.push_str(&text[..take]);
            remaining -= take;
            skip = 0;
            node = self.next(node);
        }
        out
    }

    pub fn get_text(&self) -> String {
        let mut out = String::with_capacity(self.len());
        for piece in self.pieces() {
            out.push_str(self.piece_text(piece));
        }
        out
    }

    /// Content of `line` (1-based) without its line break.
    pub fn get_line_content(&self, line: usize) -> Result<String, PieceTreeError> {
        self.check_line(line)?;
        let start = self.line_start_offset(line);
        Ok(self.collect_range(start, self.line_content_end(line)))
    }

    /// Length in bytes of `line` without its line break.
    pub fn get_line_length(&self, line: usize) -> Result<usize, PieceTreeError> {
        self.check_line(line)?;
        Ok(self.line_content_end(line) - self.line_start_offset(line))
    }

    /// Every line, without line breaks, in a single pass over the pieces.
    pub fn get_lines_content(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.line_count());
        let mut current = String::new();

        for piece in self.pieces() {
            let text = self.piece_text(piece);
            let bytes = text.as_bytes();
            let mut line_start = 0;
            let mut i = 0;
            while i < bytes.len() {
                match bytes[i] {
                    b'\r' | b'\n' => {
                        current.push_str(&text[line_start..i]);
                        lines.push(std::mem::take(&mut current));
                        // A `\r\n` never straddles two pieces.
                        if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                            i += 1;
                        }
                        line_start = i + 1;
                    }
                    _ => {}
                }
                i += 1;
            }
            current.push_str(&text[line_start..]);
        }

        lines.push(current);
        lines
    }
}
