//! Read-only views the diff algorithms run over.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

/// An indexable, read-only sequence of comparable elements.
pub trait Sequence {
    type Element: PartialEq;

    fn len(&self) -> usize;

    /// Element at the 0-based `index`; `index < len()`.
    fn element_at(&self, index: usize) -> Self::Element;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + PartialEq> Sequence for [T] {
    type Element = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn element_at(&self, index: usize) -> T {
        self[index].clone()
    }
}

impl<T: Clone + PartialEq> Sequence for Vec<T> {
    type Element = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn element_at(&self, index: usize) -> T {
        self[index].clone()
    }
}

/// Hands out one id per distinct line so lines compare as integers.
#[derive(Debug, Default)]
pub struct LineInterner {
    ids: HashMap<String, u32>,
}

impl LineInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, line: &str) -> u32 {
        if let Some(&id) = self.ids.get(line) {
            return id;
        }
        let id = self.ids.len() as u32;
        self.ids.insert(line.to_string(), id);
        id
    }
}

/// Lines of a document, compared by interned id.
#[derive(Debug, Clone)]
pub struct LineSequence<'a> {
    hashes: Vec<u32>,
    lines: Vec<&'a str>,
}

impl<'a> LineSequence<'a> {
    /// Interns `lines` through `interner`. With `ignore_trim_whitespace`,
    /// lines that only differ in leading or trailing whitespace compare equal.
    pub fn new<S: AsRef<str>>(
        lines: &'a [S],
        interner: &mut LineInterner,
        ignore_trim_whitespace: bool,
    ) -> Self {
        let lines: Vec<&'a str> = lines.iter().map(AsRef::as_ref).collect();
        let hashes = lines
            .iter()
            .map(|line| {
                if ignore_trim_whitespace {
                    interner.intern(line.trim())
                } else {
                    interner.intern(line)
                }
            })
            .collect();
        Self { hashes, lines }
    }

    /// Both sides of a line diff, sharing one interner.
    pub fn pair<S: AsRef<str>>(
        original: &'a [S],
        modified: &'a [S],
        ignore_trim_whitespace: bool,
    ) -> (Self, Self) {
        let mut interner = LineInterner::new();
        let original = Self::new(original, &mut interner, ignore_trim_whitespace);
        let modified = Self::new(modified, &mut interner, ignore_trim_whitespace);
        (original, modified)
    }

    /// The untouched text of line `index`.
    pub fn line(&self, index: usize) -> &'a str {
        self.lines[index]
    }

    /// Lines `range` joined with `\n`.
    pub fn text(&self, range: std::ops::Range<usize>) -> String {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);
        self.lines[start..end].join("\n")
    }
}

impl Sequence for LineSequence<'_> {
    type Element = u32;

    fn len(&self) -> usize {
        self.hashes.len()
    }

    fn element_at(&self, index: usize) -> u32 {
        self.hashes[index]
    }
}

/// Weight for matching line `original` against line `modified`: long equal
/// lines are worth more than short or blank ones.
pub fn line_equality_score(original: &str, modified: &str) -> f64 {
    if original == modified {
        if modified.is_empty() {
            0.1
        } else {
            1.0 + (1.0 + modified.len() as f64).ln()
        }
    } else {
        0.99
    }
}

/// Extended grapheme clusters of a string.
#[derive(Debug, Clone)]
pub struct CharSequence<'a> {
    graphemes: Vec<&'a str>,
    offsets: Vec<usize>,
    len_bytes: usize,
}

impl<'a> CharSequence<'a> {
    pub fn new(text: &'a str) -> Self {
        let (offsets, graphemes) = text.grapheme_indices(true).unzip();
        Self {
            graphemes,
            offsets,
            len_bytes: text.len(),
        }
    }

    /// Byte offset in the source text of grapheme `index`; `len()` maps to
    /// the end of the text.
    pub fn byte_offset(&self, index: usize) -> usize {
        self.offsets.get(index).copied().unwrap_or(self.len_bytes)
    }
}

impl<'a> Sequence for CharSequence<'a> {
    type Element = &'a str;

    fn len(&self) -> usize {
        self.graphemes.len()
    }

    fn element_at(&self, index: usize) -> &'a str {
        self.graphemes[index]
    }
}
