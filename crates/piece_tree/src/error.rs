use thiserror::Error;

/// Caller misuse detected before a tree operation touched anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceTreeError {
    #[error("offset {offset} is out of bounds for length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("range {start}..{end} is out of bounds for length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("line {line} is out of bounds (line count {line_count})")]
    LineOutOfBounds { line: usize, line_count: usize },

    #[error("column {column} is out of bounds for line {line} (max column {max_column})")]
    ColumnOutOfBounds {
        line: usize,
        column: usize,
        max_column: usize,
    },

    #[error("offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("chunk {index} does not exist ({count} chunks)")]
    ChunkOutOfBounds { index: usize, count: usize },
}
