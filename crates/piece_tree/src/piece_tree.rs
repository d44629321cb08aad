//! A piece tree: document text kept as an ordered list of windows ("pieces")
//! into immutable chunks, with the order held by a red-black tree whose nodes
//! cache the length and line-feed count of their left subtree.

mod chunk;
mod edit;
mod eol;
mod error;
mod iter;
mod node;
mod piece;
mod position;
mod query;
mod rb_tree;

pub use chunk::{BufferCursor, ChunkStore, DEFAULT_CHUNK_SIZE, StringBuffer};
pub use eol::{EndOfLine, EolCounts, normalize_eol};
pub use error::PieceTreeError;
pub use iter::{PieceTreeSnapshot, Pieces};
pub use piece::Piece;
pub use position::Position;

use node::{NodeId, SENTINEL, TreeNode};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceTreeOptions {
    /// Largest chunk created from a single inserted or loaded text.
    pub chunk_size: usize,
    /// Line terminator assumed when the content has none.
    pub default_eol: EndOfLine,
}

impl Default for PieceTreeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_eol: EndOfLine::Lf,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PieceTree {
    chunks: ChunkStore,
    nodes: Vec<TreeNode>,
    free: Vec<NodeId>,
    root: NodeId,
    piece_count: usize,
    eol: EndOfLine,
    options: PieceTreeOptions,
}

impl PieceTree {
    /// Builds a tree with one piece per non-empty chunk, in order.
    pub fn new(chunks: Vec<StringBuffer>) -> Self {
        Self::from_chunks(chunks, PieceTreeOptions::default())
    }

    pub fn with_options(text: &str, options: PieceTreeOptions) -> Self {
        let chunks = chunk::split_text(text, options.chunk_size)
            .into_iter()
            .map(|part| StringBuffer::new(part.to_string()))
            .collect();
        Self::from_chunks(chunks, options)
    }

    pub fn from_chunks(chunks: Vec<StringBuffer>, options: PieceTreeOptions) -> Self {
        let mut tree = Self::empty(options);

        let mut counts = EolCounts::default();
        let mut boundaries = Vec::with_capacity(chunks.len());
        let mut offset = 0;
        let mut last = SENTINEL;
        let mut ends_with_cr = false;
        for chunk in chunks.into_iter().filter(|chunk| !chunk.is_empty()) {
            counts.merge(EolCounts::scan(chunk.as_str()));
            if ends_with_cr && chunk.as_str().starts_with('\n') {
                counts.join_split_pair();
            }
            ends_with_cr = chunk.as_str().ends_with('\r');
            offset += chunk.len();
            boundaries.push(offset);

            let index = tree.chunks.push(chunk);
            let piece = Piece::whole(tree.chunks.chunk(index), index);
            last = tree.rb_insert_right(last, piece);
        }
        tree.eol = counts.dominant(options.default_eol);

        // Caller-supplied chunks may cut a `\r\n` in half.
        for boundary in boundaries {
            tree.fix_crlf_at(boundary);
        }
        tree
    }

    fn empty(options: PieceTreeOptions) -> Self {
        Self {
            chunks: ChunkStore::new(),
            nodes: vec![TreeNode::sentinel()],
            free: Vec::new(),
            root: SENTINEL,
            piece_count: 0,
            eol: options.default_eol,
            options,
        }
    }

    /// Document length in bytes.
    pub fn len(&self) -> usize {
        self.nodes[self.root].subtree_len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines; an empty document has one.
    pub fn line_count(&self) -> usize {
        self.nodes[self.root].subtree_lf + 1
    }

    pub fn piece_count(&self) -> usize {
        self.piece_count
    }

    pub fn pieces(&self) -> Pieces<'_> {
        Pieces::new(self)
    }

    /// Every chunk ever stored, including ones no piece points at anymore.
    pub fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }

    pub fn options(&self) -> &PieceTreeOptions {
        &self.options
    }

    pub fn eol(&self) -> EndOfLine {
        self.eol
    }

    /// Rewrites every line break as `eol` and rebuilds the tree from the
    /// normalized text.
    pub fn set_eol(&mut self, eol: EndOfLine) {
        trace!(?eol, "set_eol");
        let text = normalize_eol(&self.get_text(), eol);
        let mut rebuilt = Self::with_options(&text, self.options);
        rebuilt.eol = eol;
        *self = rebuilt;
    }

    pub fn snapshot(&self) -> PieceTreeSnapshot {
        PieceTreeSnapshot::new(self)
    }
}

impl Default for PieceTree {
    fn default() -> Self {
        Self::empty(PieceTreeOptions::default())
    }
}

impl From<&str> for PieceTree {
    fn from(text: &str) -> Self {
        Self::with_options(text, PieceTreeOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(chunks: &[&str]) -> PieceTree {
        PieceTree::new(chunks.iter().map(|c| StringBuffer::new(c.to_string())).collect())
    }

    /// Splits like the tree does: `\r\n`, `\r` and `\n` all end a line.
    fn reference_lines(text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    lines.push(std::mem::take(&mut current));
                }
                '\n' => lines.push(std::mem::take(&mut current)),
                c => current.push(c),
            }
        }
        lines.push(current);
        lines
    }

    fn assert_consistent(tree: &PieceTree, expected: &str) {
        tree.assert_invariants();
        assert_eq!(tree.get_text(), expected);
        assert_eq!(tree.len(), expected.len());

        let lines = reference_lines(expected);
        assert_eq!(tree.line_count(), lines.len());
        assert_eq!(tree.get_lines_content(), lines);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(tree.get_line_content(i + 1).unwrap(), *line);
            assert_eq!(tree.get_line_length(i + 1).unwrap(), line.len());
        }

        let pieces: Vec<&Piece> = tree.pieces().collect();
        assert_eq!(pieces.len(), tree.piece_count());
        for pair in pieces.windows(2) {
            let split_crlf = tree.piece_text(pair[0]).ends_with('\r')
                && tree.piece_text(pair[1]).starts_with('\n');
            assert!(!split_crlf, "split CRLF left between pieces");
        }

        for offset in 0..=expected.len() {
            if !expected.is_char_boundary(offset) {
                continue;
            }
            let position = tree.get_position_at(offset).unwrap();
            assert_eq!(tree.get_offset_at(position).unwrap(), offset, "at {position}");
        }
    }

    #[test]
    fn lines_basic_unix() {
        let tree = tree_of(&["Hello\nWorld"]);

        let lines = tree.get_lines_content();
        assert_eq!(lines, vec!["Hello", "World"]);

        assert_eq!(tree.get_line_content(1).unwrap(), "Hello");
        assert_eq!(tree.get_line_content(2).unwrap(), "World");
        assert_eq!(
            tree.get_line_content(3),
            Err(PieceTreeError::LineOutOfBounds { line: 3, line_count: 2 })
        );
    }

    #[test]
    fn lines_crlf_single_buffer() {
        let tree = tree_of(&["abc\r\ndef\r\nxyz"]);

        let lines = tree.get_lines_content();
        assert_eq!(lines, vec!["abc", "def", "xyz"]);

        assert_eq!(tree.get_line_content(1).unwrap(), "abc");
        assert_eq!(tree.get_line_content(2).unwrap(), "def");
        assert_eq!(tree.get_line_content(3).unwrap(), "xyz");
        assert!(tree.get_line_content(4).is_err());
        assert_eq!(tree.eol(), EndOfLine::CrLf);
    }

    #[test]
    fn lines_multiple_chunks() {
        let tree = tree_of(&["foo\n", "bar\nbaz"]);

        let lines = tree.get_lines_content();
        assert_eq!(lines, vec!["foo", "bar", "baz"]);

        assert_eq!(tree.get_line_content(1).unwrap(), "foo");
        assert_eq!(tree.get_line_content(2).unwrap(), "bar");
        assert_eq!(tree.get_line_content(3).unwrap(), "baz");
        assert!(tree.get_line_content(4).is_err());
    }

    #[test]
    fn lines_trailing_newline() {
        let tree = tree_of(&["a\nb\n"]);

        let lines = tree.get_lines_content();
        assert_eq!(lines, vec!["a", "b", ""]);

        assert_eq!(tree.get_line_content(1).unwrap(), "a");
        assert_eq!(tree.get_line_content(2).unwrap(), "b");
        assert_eq!(tree.get_line_content(3).unwrap(), "");
        assert!(tree.get_line_content(4).is_err());
    }

    #[test]
    fn crlf_split_across_chunks_is_joined() {
        let tree = tree_of(&["one\r", "\ntwo"]);
        assert_eq!(tree.line_count(), 2);
        assert_eq!(tree.piece_count(), 3);
        assert_eq!(tree.eol(), EndOfLine::CrLf);
        assert_consistent(&tree, "one\r\ntwo");

        let tree = tree_of(&["a\r", "\nb\r\nc\n"]);
        assert_eq!(tree.eol(), EndOfLine::CrLf);
        assert_eq!(tree_of(&["a\r", "b\n"]).eol(), EndOfLine::Lf);
    }

    #[test]
    fn empty_tree() {
        let tree = PieceTree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.line_count(), 1);
        assert_eq!(tree.get_lines_content(), vec![""]);
        assert_eq!(tree.get_position_at(0).unwrap(), Position::new(1, 1));
        assert_eq!(tree.get_offset_at(Position::new(1, 1)).unwrap(), 0);
        assert_eq!(tree.pieces().count(), 0);
        assert_consistent(&tree, "");
    }

    #[test]
    fn insert_at_beginning_middle_and_end() {
        let mut tree = PieceTree::from("world");
        tree.insert(0, "Hello ").unwrap();
        tree.insert(11, "!").unwrap();
        tree.insert(5, ",").unwrap();
        assert_consistent(&tree, "Hello, world!");
        assert_eq!(tree.piece_count(), 5);
    }

    #[test]
    fn insert_into_empty_tree() {
        let mut tree = PieceTree::default();
        tree.insert(0, "abc\ndef").unwrap();
        assert_consistent(&tree, "abc\ndef");
    }

    #[test]
    fn delete_within_one_piece() {
        let mut tree = PieceTree::from("Hello beautiful world!");
        tree.delete(6, 10).unwrap();
        assert_consistent(&tree, "Hello world!");
        tree.delete(0, 6).unwrap();
        assert_consistent(&tree, "world!");
        tree.delete(5, 1).unwrap();
        assert_consistent(&tree, "world");
        tree.delete(0, 5).unwrap();
        assert_consistent(&tree, "");
    }

    #[test]
    fn delete_across_pieces() {
        let mut tree = PieceTree::from("aaa\n");
        tree.insert(4, "bbb\n").unwrap();
        tree.insert(8, "ccc\n").unwrap();
        tree.insert(12, "ddd").unwrap();
        tree.delete(2, 9).unwrap();
        assert_consistent(&tree, "aa\nddd");
        assert_eq!(tree.line_count(), 2);
    }

    #[test]
    fn typing_reuses_the_change_chunk() {
        let mut tree = PieceTree::from("start\n");
        let before = tree.snapshot();
        for (i, c) in "typed text\nmore".chars().enumerate() {
            tree.insert(6 + i, &c.to_string()).unwrap();
        }
        assert_eq!(tree.chunks().len(), 2);
        assert_consistent(&tree, "start\ntyped text\nmore");
        assert_eq!(before.text(), "start\n");

        let mut tree = PieceTree::default();
        for (i, c) in "a\r\nb\r".chars().enumerate() {
            tree.insert(i, &c.to_string()).unwrap();
        }
        assert_consistent(&tree, "a\r\nb\r");
        assert_eq!(tree.line_count(), 3);
    }

    #[test]
    fn insert_between_cr_and_lf() {
        let mut tree = PieceTree::from("a\r\nb");
        assert_eq!(tree.get_position_at(2).unwrap(), Position::new(1, 3));
        tree.insert(2, "x").unwrap();
        assert_consistent(&tree, "a\rx\nb");
        assert_eq!(tree.line_count(), 3);
    }

    #[test]
    fn insert_completing_a_crlf_pair() {
        let mut tree = PieceTree::from("a\rb");
        tree.insert(2, "\n").unwrap();
        assert_consistent(&tree, "a\r\nb");
        assert_eq!(tree.line_count(), 2);

        let mut tree = PieceTree::from("a\nb");
        tree.insert(1, "\r").unwrap();
        assert_consistent(&tree, "a\r\nb");
        assert_eq!(tree.line_count(), 2);
    }

    #[test]
    fn delete_joining_cr_and_lf() {
        let mut tree = PieceTree::from("a\rxyz\nb");
        tree.delete(2, 3).unwrap();
        assert_consistent(&tree, "a\r\nb");
        assert_eq!(tree.line_count(), 2);
        assert_eq!(tree.get_line_content(1).unwrap(), "a");
    }

    #[test]
    fn position_between_cr_and_lf_round_trips() {
        let tree = PieceTree::from("ab\r\ncd");
        assert_eq!(tree.get_position_at(3).unwrap(), Position::new(1, 4));
        assert_eq!(tree.get_offset_at(Position::new(1, 4)).unwrap(), 3);
        assert_eq!(tree.get_position_at(4).unwrap(), Position::new(2, 1));
        assert_eq!(tree.get_offset_at(Position::new(2, 3)).unwrap(), 6);
    }

    #[test]
    fn rejects_out_of_range_arguments() {
        let mut tree = PieceTree::from("héllo\nworld");
        assert_eq!(
            tree.insert(40, "x"),
            Err(PieceTreeError::OffsetOutOfBounds { offset: 40, len: 12 })
        );
        assert_eq!(
            tree.insert(2, "x"),
            Err(PieceTreeError::NotCharBoundary { offset: 2 })
        );
        assert_eq!(
            tree.delete(10, 5),
            Err(PieceTreeError::RangeOutOfBounds { start: 10, end: 15, len: 12 })
        );
        assert_eq!(
            tree.delete(1, 1),
            Err(PieceTreeError::NotCharBoundary { offset: 2 })
        );
        assert_eq!(
            tree.get_offset_at(Position::new(1, 8)),
            Err(PieceTreeError::ColumnOutOfBounds { line: 1, column: 8, max_column: 7 })
        );
        assert!(tree.get_offset_at(Position::new(1, 0)).is_err());
        assert!(tree.get_offset_at(Position::new(0, 1)).is_err());
        assert!(tree.get_position_at(13).is_err());
        assert_eq!(
            tree.get_position_at(2),
            Err(PieceTreeError::NotCharBoundary { offset: 2 })
        );
        assert_eq!(
            tree.get_offset_at(Position::new(1, 3)),
            Err(PieceTreeError::NotCharBoundary { offset: 2 })
        );
        assert_eq!(tree.get_position_at(3).unwrap(), Position::new(1, 4));
        assert_eq!(tree.get_offset_at(Position::new(1, 4)).unwrap(), 3);
        assert!(tree.get_value_in_range(3, 2).is_err());
        assert_consistent(&tree, "héllo\nworld");
    }

    #[test]
    fn value_in_range_spans_pieces() {
        let mut tree = PieceTree::from("0123");
        tree.insert(4, "4567").unwrap();
        tree.insert(0, "ab").unwrap();
        assert_eq!(tree.get_value_in_range(1, 8).unwrap(), "b012345");
        assert_eq!(tree.get_value_in_range(3, 3).unwrap(), "");
    }

    #[test]
    fn small_chunk_size_splits_without_breaking_pairs() {
        let options = PieceTreeOptions {
            chunk_size: 3,
            ..PieceTreeOptions::default()
        };
        let text = "ab\r\ncdé\r\nfg";
        let mut tree = PieceTree::with_options(text, options);
        assert!(tree.piece_count() > 1);
        assert_consistent(&tree, text);

        tree.insert(4, "x\r\ny").unwrap();
        assert_consistent(&tree, "ab\r\nx\r\nycdé\r\nfg");
    }

    #[test]
    fn set_eol_normalizes_every_break() {
        let mut tree = PieceTree::from("a\nb\r\nc\rd");
        assert_eq!(tree.eol(), EndOfLine::Lf);
        tree.set_eol(EndOfLine::CrLf);
        assert_eq!(tree.eol(), EndOfLine::CrLf);
        assert_consistent(&tree, "a\r\nb\r\nc\r\nd");
    }

    #[test]
    fn snapshot_ignores_later_edits() {
        let mut tree = PieceTree::from("abc");
        tree.insert(3, "def").unwrap();
        let mut snapshot = tree.snapshot().with_bom("\u{feff}");
        tree.delete(0, 6).unwrap();
        tree.insert(0, "zzz").unwrap();

        assert_eq!(snapshot.text(), "\u{feff}abcdef");
        assert_eq!(snapshot.read().as_deref(), Some("\u{feff}"));
        assert_eq!(snapshot.read().as_deref(), Some("abc"));
        assert_eq!(snapshot.read().as_deref(), Some("def"));
        assert_eq!(snapshot.read(), None);
        assert_eq!(tree.get_text(), "zzz");
    }

    #[test]
    fn pieces_is_restartable() {
        let mut tree = PieceTree::from("xy");
        tree.insert(1, "-").unwrap();
        let first: Vec<Piece> = tree.pieces().copied().collect();
        let second: Vec<Piece> = tree.pieces().copied().collect();
        assert_eq!(first, second);
        assert_eq!(tree.pieces().len(), 3);
    }

    #[test]
    fn many_edits_keep_tree_balanced() {
        let mut tree = PieceTree::default();
        let mut expected = String::new();
        for i in 0..300 {
            let offset = (i * 7) % (expected.len() + 1);
            let text = if i % 5 == 0 { "\r\n" } else { "ab" };
            tree.insert(offset, text).unwrap();
            expected.insert_str(offset, text);
            if i % 3 == 0 && expected.len() > 4 {
                let start = (i * 13) % (expected.len() - 3);
                tree.delete(start, 3).unwrap();
                expected.replace_range(start..start + 3, "");
            }
            tree.assert_invariants();
        }
        assert_consistent(&tree, &expected);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Edit {
            Insert { at: usize, text: String },
            Delete { at: usize, len: usize },
        }

        fn edit() -> impl Strategy<Value = Edit> {
            prop_oneof![
                (any::<usize>(), "[ab\r\né]{1,8}").prop_map(|(at, text)| Edit::Insert { at, text }),
                (any::<usize>(), 1usize..12).prop_map(|(at, len)| Edit::Delete { at, len }),
            ]
        }

        fn floor_boundary(text: &str, mut offset: usize) -> usize {
            while !text.is_char_boundary(offset) {
                offset -= 1;
            }
            offset
        }

        proptest! {
            #[test]
            fn edits_match_a_plain_string(
                initial in "[ab\r\n]{0,16}",
                edits in prop::collection::vec(edit(), 1..40),
            ) {
                let mut tree = PieceTree::from(initial.as_str());
                let mut model = initial.clone();

                for edit in edits {
                    match edit {
                        Edit::Insert { at, text } => {
                            let at = floor_boundary(&model, at % (model.len() + 1));
                            tree.insert(at, &text).unwrap();
                            model.insert_str(at, &text);
                        }
                        Edit::Delete { at, len } => {
                            if model.is_empty() {
                                continue;
                            }
                            let start = floor_boundary(&model, at % model.len());
                            let end = floor_boundary(&model, (start + len).min(model.len()));
                            tree.delete(start, end - start).unwrap();
                            model.replace_range(start..end, "");
                        }
                    }
                }

                assert_consistent(&tree, &model);
            }

            #[test]
            fn chunked_construction_matches_text(parts in prop::collection::vec("[xy\r\n]{0,6}", 0..8)) {
                let tree = PieceTree::new(parts.iter().map(|p| StringBuffer::new(p.clone())).collect());
                assert_consistent(&tree, &parts.concat());
            }
        }
    }
}
