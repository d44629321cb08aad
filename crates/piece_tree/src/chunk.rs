use std::ops::Range;
use std::sync::Arc;

use crate::error::PieceTreeError;
use crate::piece::Piece;

/// Upper bound (in bytes) for a single chunk created from inserted or loaded text.
pub const DEFAULT_CHUNK_SIZE: usize = 65535;

/// A line/column coordinate local to one chunk. Both parts are 0-based and the
/// column counts bytes from the chunk's line start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BufferCursor {
    pub line: usize,
    pub column: usize,
}

impl BufferCursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A block of raw text together with the offsets at which its
/// lines start.
#[derive(Debug, Clone)]
pub struct StringBuffer {
    buffer: String,
    line_starts: Vec<usize>,
}

impl StringBuffer {
    pub fn new(buffer: String) -> Self {
        let line_starts = Self::create_line_starts(&buffer);
        Self {
            buffer,
            line_starts,
        }
    }

    /// Offsets of every line start. `\r\n` is a single break, lone `\r` and
    /// lone `\n` are breaks of their own. The first entry is always 0.
    pub fn create_line_starts(text: &str) -> Vec<usize> {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut i = 0;

        while i < len {
            match bytes[i] {
                b'\r' => {
                    if i + 1 < len && bytes[i + 1] == b'\n' {
                        line_starts.push(i + 2);
                        i += 1;
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                b'\n' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }

        line_starts
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Number of line breaks in the whole chunk.
    pub fn line_feed_count(&self) -> usize {
        self.line_starts.len() - 1
    }

    pub fn offset_of(&self, cursor: BufferCursor) -> usize {
        self.line_starts[cursor.line] + cursor.column
    }

    pub fn cursor_at(&self, offset: usize) -> BufferCursor {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        BufferCursor::new(line, offset - self.line_starts[line])
    }

    pub fn end_cursor(&self) -> BufferCursor {
        self.cursor_at(self.buffer.len())
    }

    /// Appends `text` after the current end. Existing cursors keep their
    /// meaning unless `text` starts with the `\n` of a `\r\n` whose `\r`
    /// ends the chunk, which callers must avoid.
    pub(crate) fn push_str(&mut self, text: &str) {
        debug_assert!(!(self.buffer.ends_with('\r') && text.starts_with('\n')));
        let base = self.buffer.len();
        self.buffer.push_str(text);
        self.line_starts
            .extend(Self::create_line_starts(text).into_iter().skip(1).map(|start| start + base));
    }

    pub(crate) fn byte_at(&self, offset: usize) -> Option<u8> {
        self.buffer.as_bytes().get(offset).copied()
    }
}

/// Append-only storage for every chunk a tree has ever referenced.
///
/// Chunks are reference counted so snapshots can keep reading them after the
/// tree moves on. Edited text goes to a shared change chunk that only ever
/// grows at its end; a chunk still held by a snapshot is copied before it
/// grows.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<Arc<StringBuffer>>,
    change_chunk: Option<usize>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `text` as a new chunk and returns its index.
    pub fn append(&mut self, text: String) -> usize {
        self.push(StringBuffer::new(text))
    }

    /// Appends `text` to the change chunk and returns the chunk index with
    /// the byte range `text` now occupies. A new change chunk is started when
    /// the current one would grow past `limit` bytes or when `text` would
    /// complete a `\r\n` across its end.
    pub fn append_change(&mut self, text: &str, limit: usize) -> (usize, Range<usize>) {
        if let Some(index) = self.change_chunk {
            let chunk = &self.chunks[index];
            let start = chunk.len();
            let joins_crlf = chunk.as_str().ends_with('\r') && text.starts_with('\n');
            if start + text.len() <= limit && !joins_crlf {
                Arc::make_mut(&mut self.chunks[index]).push_str(text);
                return (index, start..start + text.len());
            }
        }
        let index = self.append(text.to_string());
        self.change_chunk = Some(index);
        (index, 0..text.len())
    }

    pub(crate) fn push(&mut self, chunk: StringBuffer) -> usize {
        self.chunks.push(Arc::new(chunk));
        self.chunks.len() - 1
    }

    pub fn get(&self, chunk_index: usize) -> Option<&StringBuffer> {
        self.chunks.get(chunk_index).map(Arc::as_ref)
    }

    pub fn chunks(&self) -> &[Arc<StringBuffer>] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Text of `chunk_index` between two chunk-local cursors.
    pub fn slice(
        &self,
        chunk_index: usize,
        start: BufferCursor,
        end: BufferCursor,
    ) -> Result<&str, PieceTreeError> {
        let chunk = self
            .get(chunk_index)
            .ok_or(PieceTreeError::ChunkOutOfBounds {
                index: chunk_index,
                count: self.chunks.len(),
            })?;
        let start_offset = Self::checked_offset(chunk, start)?;
        let end_offset = Self::checked_offset(chunk, end)?;
        if start_offset > end_offset {
            return Err(PieceTreeError::RangeOutOfBounds {
                start: start_offset,
                end: end_offset,
                len: chunk.len(),
            });
        }
        chunk
            .as_str()
            .get(start_offset..end_offset)
            .ok_or(PieceTreeError::NotCharBoundary {
                offset: if chunk.as_str().is_char_boundary(start_offset) {
                    end_offset
                } else {
                    start_offset
                },
            })
    }

    fn checked_offset(chunk: &StringBuffer, cursor: BufferCursor) -> Result<usize, PieceTreeError> {
        let line_starts = chunk.line_starts();
        if cursor.line >= line_starts.len() {
            return Err(PieceTreeError::LineOutOfBounds {
                line: cursor.line,
                line_count: line_starts.len(),
            });
        }
        let offset = line_starts[cursor.line] + cursor.column;
        if offset > chunk.len() {
            return Err(PieceTreeError::OffsetOutOfBounds {
                offset,
                len: chunk.len(),
            });
        }
        Ok(offset)
    }

    pub(crate) fn chunk(&self, chunk_index: usize) -> &StringBuffer {
        &self.chunks[chunk_index]
    }

    pub(crate) fn piece_text(&self, piece: &Piece) -> &str {
        let chunk = self.chunk(piece.chunk_index());
        &chunk.as_str()[chunk.offset_of(piece.start())..chunk.offset_of(piece.end())]
    }
}

/// Cuts `text` into pieces of roughly `chunk_size` bytes. A cut never lands
/// inside a UTF-8 character or between the two bytes of `\r\n`.
pub(crate) fn split_text(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let bytes = text.as_bytes();
    let mut parts = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        if end < text.len() && bytes[end - 1] == b'\r' && bytes[end] == b'\n' {
            end += 1;
        }
        parts.push(&text[start..end]);
        start = end;
    }

    parts
}
