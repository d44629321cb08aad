mod buffer;
mod buffer_builder;
mod io;
mod line_diff;

pub use crate::buffer::TextBuffer;
pub use crate::buffer_builder::{TextBufferBuilder, UTF8_BOM};
pub use crate::io::{load_from_path, read_chunks, read_chunks_from_path};
pub use crate::line_diff::{
    DiffOptions, LineRange, LineRangeMapping, LinesDiff, compute_chars_diff, compute_lines_diff,
};

pub use piece_tree::{EndOfLine, PieceTreeError, PieceTreeOptions, Position};
pub use sequence_diff::DiffAlgorithmKind;
