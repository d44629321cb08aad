//! Line and character diffs between two texts.

use std::time::Duration;

use sequence_diff::{
    CharSequence, DateTimeout, DiffAlgorithm, DiffAlgorithmKind, DiffAlgorithmResult,
    EqualityScore, InfiniteTimeout, LineSequence, OffsetRange, SequenceDiff, Timeout, line_equality_score,
};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    pub algorithm: DiffAlgorithmKind,
    /// `None` lets the computation run to completion.
    pub max_computation_time: Option<Duration>,
    /// Lines differing only in leading or trailing whitespace compare equal.
    pub ignore_trim_whitespace: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithmKind::Auto,
            max_computation_time: Some(Duration::from_secs(5)),
            ignore_trim_whitespace: true,
        }
    }
}

impl DiffOptions {
    fn timeout(&self) -> Box<dyn Timeout> {
        match self.max_computation_time {
            Some(limit) => Box::new(DateTimeout::new(limit)),
            None => Box::new(InfiniteTimeout),
        }
    }
}

/// A 1-based range of lines, `end_line_exclusive` not included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start_line: usize,
    pub end_line_exclusive: usize,
}

impl LineRange {
    pub fn new(start_line: usize, end_line_exclusive: usize) -> Self {
        Self {
            start_line,
            end_line_exclusive,
        }
    }

    /// The 1-based lines matching 0-based line indices `range`.
    pub fn from_offsets(range: OffsetRange) -> Self {
        Self::new(range.start + 1, range.end_exclusive + 1)
    }

    pub fn len(&self) -> usize {
        self.end_line_exclusive - self.start_line
    }

    pub fn is_empty(&self) -> bool {
        self.start_line == self.end_line_exclusive
    }
}

/// Lines `original` of the first text were replaced by lines `modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRangeMapping {
    pub original: LineRange,
    pub modified: LineRange,
}

impl From<SequenceDiff> for LineRangeMapping {
    fn from(diff: SequenceDiff) -> Self {
        Self {
            original: LineRange::from_offsets(diff.seq1_range),
            modified: LineRange::from_offsets(diff.seq2_range),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinesDiff {
    pub changes: Vec<LineRangeMapping>,
    /// The computation gave up and `changes` replaces everything.
    pub hit_timeout: bool,
}

impl LinesDiff {
    pub fn is_identical(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Diffs two documents given as lines without terminators. An empty list is
/// treated as a single empty line.
pub fn compute_lines_diff<S: AsRef<str>>(
    original: &[S],
    modified: &[S],
    options: &DiffOptions,
) -> LinesDiff {
    let empty = [""];
    let original: Vec<&str> = normalize(original, &empty);
    let modified: Vec<&str> = normalize(modified, &empty);

    if original.len() <= 1 && original == modified {
        return LinesDiff::default();
    }
    if is_single_empty_line(&original) || is_single_empty_line(&modified) {
        return LinesDiff {
            changes: vec![LineRangeMapping {
                original: LineRange::new(1, original.len() + 1),
                modified: LineRange::new(1, modified.len() + 1),
            }],
            hit_timeout: false,
        };
    }

    let (seq1, seq2) = LineSequence::pair(&original, &modified, options.ignore_trim_whitespace);
    let score = |i: usize, j: usize| line_equality_score(original[i], modified[j]);
    let score: EqualityScore<'_> = &score;
    let timeout = options.timeout();
    let result = options
        .algorithm
        .compute_with(&seq1, &seq2, timeout.as_ref(), Some(score));

    trace!(
        original = original.len(),
        modified = modified.len(),
        changes = result.diffs.len(),
        hit_timeout = result.hit_timeout,
        "lines diff"
    );
    LinesDiff {
        changes: result.diffs.into_iter().map(LineRangeMapping::from).collect(),
        hit_timeout: result.hit_timeout,
    }
}

fn normalize<'a, S: AsRef<str>>(lines: &'a [S], empty: &'a [&'a str]) -> Vec<&'a str> {
    if lines.is_empty() {
        empty.to_vec()
    } else {
        lines.iter().map(AsRef::as_ref).collect()
    }
}

fn is_single_empty_line(lines: &[&str]) -> bool {
    lines.len() == 1 && lines[0].is_empty()
}

/// Diffs two strings grapheme by grapheme. Ranges in the result are byte
/// offsets into `original` and `modified`.
pub fn compute_chars_diff(original: &str, modified: &str, options: &DiffOptions) -> DiffAlgorithmResult {
    let seq1 = CharSequence::new(original);
    let seq2 = CharSequence::new(modified);
    let timeout = options.timeout();
    let result = options.algorithm.compute_with(&seq1, &seq2, timeout.as_ref(), None);

    let to_bytes = |seq: &CharSequence<'_>, range: OffsetRange| {
        OffsetRange::new(seq.byte_offset(range.start), seq.byte_offset(range.end_exclusive))
    };
    let diffs = result
        .diffs
        .into_iter()
        .map(|diff| {
            SequenceDiff::new(to_bytes(&seq1, diff.seq1_range), to_bytes(&seq2, diff.seq2_range))
        })
        .collect();
    DiffAlgorithmResult::new(diffs, result.hit_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextBuffer;

    fn change(original: (usize, usize), modified: (usize, usize)) -> LineRangeMapping {
        LineRangeMapping {
            original: LineRange::new(original.0, original.1),
            modified: LineRange::new(modified.0, modified.1),
        }
    }

    #[test]
    fn reports_changed_line_ranges() {
        let original = ["fn main() {", "    let a = 1;", "    let b = 2;", "}"];
        let modified = ["fn main() {", "    let a = 1;", "    let c = 3;", "    let d = 4;", "}"];
        for algorithm in [DiffAlgorithmKind::DynamicProgramming, DiffAlgorithmKind::Myers, DiffAlgorithmKind::Auto] {
            let options = DiffOptions {
                algorithm,
                ..DiffOptions::default()
            };
            let diff = compute_lines_diff(&original, &modified, &options);
            assert!(!diff.hit_timeout);
            assert_eq!(diff.changes, vec![change((3, 4), (3, 5))]);
        }
    }

    #[test]
    fn trim_whitespace_option() {
        let original = ["a", "  b", "c"];
        let modified = ["a", "b  ", "c"];
        let ignoring = compute_lines_diff(&original, &modified, &DiffOptions::default());
        assert!(ignoring.is_identical());

        let strict = DiffOptions {
            ignore_trim_whitespace: false,
            ..DiffOptions::default()
        };
        let diff = compute_lines_diff(&original, &modified, &strict);
        assert_eq!(diff.changes, vec![change((2, 3), (2, 3))]);
    }

    #[test]
    fn empty_documents() {
        let none: [&str; 0] = [];
        assert!(compute_lines_diff(&none, &[""], &DiffOptions::default()).is_identical());
        assert_eq!(
            compute_lines_diff(&none, &["x", "y"], &DiffOptions::default()).changes,
            vec![change((1, 2), (1, 3))]
        );
    }

    #[test]
    fn expired_timeout_replaces_everything() {
        let original = ["a", "b", "c"];
        let modified = ["c", "b", "a"];
        let options = DiffOptions {
            max_computation_time: Some(Duration::ZERO),
            ..DiffOptions::default()
        };
        let diff = compute_lines_diff(&original, &modified, &options);
        assert!(diff.hit_timeout);
        assert_eq!(diff.changes, vec![change((1, 4), (1, 4))]);
    }

    #[test]
    fn huge_time_limit_runs_to_completion() {
        let options = DiffOptions {
            max_computation_time: Some(Duration::MAX),
            ..DiffOptions::default()
        };
        let diff = compute_lines_diff(&["a", "b"], &["b", "c"], &options);
        assert!(!diff.hit_timeout);
        assert_eq!(diff.changes, vec![change((1, 2), (1, 1)), change((3, 3), (2, 3))]);

        let chars = compute_chars_diff("ab", "abc", &options);
        assert!(!chars.hit_timeout);
        assert_eq!(
            chars.diffs,
            vec![SequenceDiff::new(OffsetRange::new(2, 2), OffsetRange::new(2, 3))]
        );
    }

    #[test]
    fn buffers_diff_by_line() {
        let before: TextBuffer = "one\r\ntwo\r\nthree".parse().unwrap();
        let mut after = before.clone();
        after.delete_at(2, 1, 5).unwrap();
        after.insert_at(2, 6, "\r\nfour").unwrap();

        assert_eq!(after.get_lines_content(), vec!["one", "three", "four"]);
        let diff = before.diff_lines(&after, &DiffOptions::default());
        assert_eq!(diff.changes, vec![change((2, 3), (2, 2)), change((4, 4), (3, 4))]);
    }

    #[test]
    fn chars_diff_uses_byte_offsets() {
        let result = compute_chars_diff("caf\u{e9} au lait", "cafe au lait", &DiffOptions::default());
        assert_eq!(
            result.diffs,
            vec![SequenceDiff::new(OffsetRange::new(3, 5), OffsetRange::new(3, 4))]
        );
        assert!(compute_chars_diff("same", "same", &DiffOptions::default()).is_identical());
    }
}
