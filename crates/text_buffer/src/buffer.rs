use std::convert::Infallible;
use std::str::FromStr;

use piece_tree::{
    EndOfLine, PieceTree, PieceTreeError, PieceTreeOptions, PieceTreeSnapshot, Pieces, Position,
    StringBuffer,
};

use crate::TextBufferBuilder;
use crate::line_diff::{DiffOptions, LinesDiff, compute_lines_diff};

#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    tree: PieceTree,
    bom: String,
}

impl TextBuffer {
    /// Build from multiple chunks
    pub fn from_chunks(chunks: Vec<StringBuffer>) -> Self {
        Self::from_chunks_with_options(chunks, PieceTreeOptions::default(), String::new())
    }

    pub(crate) fn from_chunks_with_options(
        chunks: Vec<StringBuffer>,
        options: PieceTreeOptions,
        bom: String,
    ) -> Self {
        let tree = PieceTree::from_chunks(chunks, options);
        Self { tree, bom }
    }

    /// Insert `value` at byte `offset` in the document.
    pub fn insert(&mut self, offset: usize, value: &str) -> Result<(), PieceTreeError> {
        self.tree.insert(offset, value)
    }

    /// Delete `len` bytes starting at byte `offset`.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<(), PieceTreeError> {
        self.tree.delete(offset, len)
    }

    /// Convenience: insert at (line, column), both 1-based.
    pub fn insert_at(&mut self, line: usize, column: usize, value: &str) -> Result<(), PieceTreeError> {
        let off = self.get_offset_at(line, column)?;
        self.insert(off, value)
    }

    /// Convenience: delete a range specified by start (line, column) and length in bytes.
    pub fn delete_at(&mut self, line: usize, column: usize, len: usize) -> Result<(), PieceTreeError> {
        let off = self.get_offset_at(line, column)?;
        self.delete(off, len)
    }

    /// Get complete text content, without the BOM.
    pub fn get_text(&self) -> String {
        self.tree.get_text()
    }

    pub fn get_value_in_range(&self, start: usize, end: usize) -> Result<String, PieceTreeError> {
        self.tree.get_value_in_range(start, end)
    }

    /// Get the number of lines (1-based; empty doc => 1 line).
    pub fn get_line_count(&self) -> usize {
        self.tree.line_count()
    }

    /// Get the document byte length.
    pub fn get_length(&self) -> usize {
        self.tree.len()
    }

    /// Get content of a line (1-based).
    pub fn get_line_content(&self, line_number: usize) -> Result<String, PieceTreeError> {
        self.tree.get_line_content(line_number)
    }

    /// Get all lines (without EOL).
    pub fn get_lines_content(&self) -> Vec<String> {
        self.tree.get_lines_content()
    }

    /// Get the byte length (without EOL) of a line (1-based).
    pub fn get_line_length(&self, line_number: usize) -> Result<usize, PieceTreeError> {
        self.tree.get_line_length(line_number)
    }

    /// 1-based (line, column) to 0-based byte offset.
    pub fn get_offset_at(&self, line_number: usize, column: usize) -> Result<usize, PieceTreeError> {
        self.tree.get_offset_at(Position::new(line_number, column))
    }

    /// 0-based byte offset to 1-based position.
    pub fn get_position_at(&self, offset: usize) -> Result<Position, PieceTreeError> {
        self.tree.get_position_at(offset)
    }

    /// UI-friendly: max column on a line (1-based).
    pub fn get_line_max_column(&self, line_number: usize) -> Result<usize, PieceTreeError> {
        Ok(self.get_line_length(line_number)? + 1)
    }

    /// Byte order mark found at the start of the loaded text, empty if none.
    pub fn bom(&self) -> &str {
        &self.bom
    }

    pub fn eol(&self) -> EndOfLine {
        self.tree.eol()
    }

    pub fn set_eol(&mut self, eol: EndOfLine) {
        self.tree.set_eol(eol);
    }

    pub fn pieces(&self) -> Pieces<'_> {
        self.tree.pieces()
    }

    /// Frozen copy of the content, BOM first.
    pub fn snapshot(&self) -> PieceTreeSnapshot {
        self.tree.snapshot().with_bom(self.bom.as_str())
    }

    pub fn piece_tree(&self) -> &PieceTree {
        &self.tree
    }

    /// Line diff from `self` (original) to `other` (modified).
    pub fn diff_lines(&self, other: &TextBuffer, options: &DiffOptions) -> LinesDiff {
        compute_lines_diff(&self.get_lines_content(), &other.get_lines_content(), options)
    }
}

impl FromStr for TextBuffer {
    type Err = Infallible;

    /// Build from a single string, stripping a leading BOM.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = TextBufferBuilder::new();
        builder.accept_chunk(s);
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        text.parse().unwrap()
    }

    #[test]
    fn edit_by_line_and_column() {
        let mut buf = buffer("fn main() {\n}\n");
        buf.insert_at(2, 1, "    println!(\"hi\");\n").unwrap();
        assert_eq!(buf.get_text(), "fn main() {\n    println!(\"hi\");\n}\n");
        assert_eq!(buf.get_line_count(), 4);
        assert_eq!(buf.get_line_content(2).unwrap(), "    println!(\"hi\");");
        assert_eq!(buf.get_line_max_column(2).unwrap(), 20);

        buf.delete_at(2, 1, 4).unwrap();
        assert_eq!(buf.get_line_content(2).unwrap(), "println!(\"hi\");");
        assert_eq!(buf.get_position_at(12).unwrap(), Position::new(2, 1));
    }

    #[test]
    fn invalid_positions_are_errors() {
        let mut buf = buffer("ab\ncd");
        assert_eq!(
            buf.insert_at(3, 1, "x"),
            Err(PieceTreeError::LineOutOfBounds { line: 3, line_count: 2 })
        );
        assert!(buf.delete_at(1, 9, 1).is_err());
        assert!(buf.get_line_length(0).is_err());
        assert_eq!(buf.get_text(), "ab\ncd");
    }

    #[test]
    fn bom_is_kept_apart_from_the_text() {
        let buf = buffer("\u{feff}hello\r\nworld");
        assert_eq!(buf.bom(), "\u{feff}");
        assert_eq!(buf.get_text(), "hello\r\nworld");
        assert_eq!(buf.get_length(), 12);
        assert_eq!(buf.eol(), EndOfLine::CrLf);
        assert_eq!(buf.snapshot().text(), "\u{feff}hello\r\nworld");
    }

    #[test]
    fn set_eol_rewrites_breaks() {
        let mut buf = buffer("a\r\nb\r\nc");
        buf.set_eol(EndOfLine::Lf);
        assert_eq!(buf.get_text(), "a\nb\nc");
        assert_eq!(buf.get_lines_content(), vec!["a", "b", "c"]);
    }
}
