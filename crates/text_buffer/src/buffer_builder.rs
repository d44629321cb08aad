use crate::buffer::TextBuffer;
use crate::io;
use piece_tree::{EndOfLine, EolCounts, PieceTreeOptions, StringBuffer};
use std::path::Path;

pub const UTF8_BOM: &str = "\u{feff}";

/// Collects text chunk by chunk and turns it into a [`TextBuffer`].
///
/// The first chunk is checked for a byte order mark, which is stripped and
/// remembered separately. Line terminators are tallied as chunks arrive so
/// the dominant one is known before the tree is built.
#[derive(Default, Debug)]
pub struct TextBufferBuilder {
    chunks: Vec<StringBuffer>,
    bom: String,
    eol_counts: EolCounts,
    seen_first_chunk: bool,
    /// A `\r` that ended the last chunk, held back in case a `\n` follows.
    pending_cr: bool,
    options: PieceTreeOptions,
}

impl TextBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PieceTreeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Accept a chunk of text (may include multiple lines).
    pub fn accept_chunk(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        let mut chunk = chunk;
        if !self.seen_first_chunk {
            self.seen_first_chunk = true;
            if let Some(rest) = chunk.strip_prefix(UTF8_BOM) {
                self.bom = UTF8_BOM.to_string();
                chunk = rest;
                if chunk.is_empty() {
                    return;
                }
            }
        }

        let mut text = String::with_capacity(chunk.len() + 1);
        if std::mem::take(&mut self.pending_cr) {
            text.push('\r');
        }
        text.push_str(chunk);
        if text.ends_with('\r') {
            text.pop();
            self.pending_cr = true;
            if text.is_empty() {
                return;
            }
        }
        self.push_text(text);
    }

    fn push_text(&mut self, text: String) {
        self.eol_counts.merge(EolCounts::scan(&text));
        self.chunks.push(StringBuffer::new(text));
    }

    pub fn bom(&self) -> &str {
        &self.bom
    }

    /// Terminator the accepted text mostly uses so far.
    pub fn eol(&self) -> EndOfLine {
        let mut counts = self.eol_counts;
        if self.pending_cr {
            counts.cr += 1;
        }
        counts.dominant(self.options.default_eol)
    }

    /// Finish building and return a `TextBuffer`.
    pub fn finish(mut self) -> TextBuffer {
        if std::mem::take(&mut self.pending_cr) {
            self.push_text("\r".to_string());
        }
        TextBuffer::from_chunks_with_options(
            std::mem::take(&mut self.chunks),
            self.options,
            std::mem::take(&mut self.bom),
        )
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> std::io::Result<TextBuffer> {
        io::load_from_path(path)
    }

    pub fn read_chunks_from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<String>> {
        io::read_chunks_from_path(path)
    }
}
