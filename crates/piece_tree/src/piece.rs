use crate::chunk::{BufferCursor, StringBuffer};

/// A `[start, end)` window into one chunk. `length` and `line_feed_cnt` are
/// caches derived from the boundaries and are rebuilt whenever they move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Piece {
    chunk_index: usize,
    start: BufferCursor,
    end: BufferCursor,
    length: usize,
    line_feed_cnt: usize,
}

impl Piece {
    pub(crate) fn new(
        chunk: &StringBuffer,
        chunk_index: usize,
        start: BufferCursor,
        end: BufferCursor,
    ) -> Self {
        let start_offset = chunk.offset_of(start);
        let end_offset = chunk.offset_of(end);
        debug_assert!(start_offset <= end_offset, "piece end precedes its start");

        // Line starts only count a `\r\n` once its `\n` is passed, so a
        // window that stops right after the `\r` owns that break itself.
        let mut line_feed_cnt = end.line - start.line;
        if end_offset > start_offset
            && chunk.byte_at(end_offset - 1) == Some(b'\r')
            && chunk.byte_at(end_offset) == Some(b'\n')
        {
            line_feed_cnt += 1;
        }

        Self {
            chunk_index,
            start,
            end,
            length: end_offset - start_offset,
            line_feed_cnt,
        }
    }

    /// A piece spanning a whole chunk.
    pub(crate) fn whole(chunk: &StringBuffer, chunk_index: usize) -> Self {
        Self::new(chunk, chunk_index, BufferCursor::default(), chunk.end_cursor())
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn start(&self) -> BufferCursor {
        self.start
    }

    pub fn end(&self) -> BufferCursor {
        self.end
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn line_feed_cnt(&self) -> usize {
        self.line_feed_cnt
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
