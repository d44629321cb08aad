use std::fmt;

use crate::offset_range::OffsetRange;

/// A pair of positions, one in each sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OffsetPair {
    pub offset1: usize,
    pub offset2: usize,
}

impl OffsetPair {
    pub const ZERO: OffsetPair = OffsetPair {
        offset1: 0,
        offset2: 0,
    };

    pub fn new(offset1: usize, offset2: usize) -> Self {
        Self { offset1, offset2 }
    }
}

/// `seq1_range` of the first sequence is replaced by `seq2_range` of the
/// second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceDiff {
    pub seq1_range: OffsetRange,
    pub seq2_range: OffsetRange,
}

impl SequenceDiff {
    pub fn new(seq1_range: OffsetRange, seq2_range: OffsetRange) -> Self {
        Self {
            seq1_range,
            seq2_range,
        }
    }

    pub fn from_offset_pairs(start: OffsetPair, end_exclusive: OffsetPair) -> Self {
        Self::new(
            OffsetRange::new(start.offset1, end_exclusive.offset1),
            OffsetRange::new(start.offset2, end_exclusive.offset2),
        )
    }

    /// The same edit seen from the other side.
    pub fn swap(&self) -> Self {
        Self::new(self.seq2_range, self.seq1_range)
    }

    pub fn join(&self, other: &SequenceDiff) -> Self {
        Self::new(
            self.seq1_range.join(&other.seq1_range),
            self.seq2_range.join(&other.seq2_range),
        )
    }

    pub fn starts(&self) -> OffsetPair {
        OffsetPair::new(self.seq1_range.start, self.seq2_range.start)
    }

    pub fn end_exclusives(&self) -> OffsetPair {
        OffsetPair::new(self.seq1_range.end_exclusive, self.seq2_range.end_exclusive)
    }

    /// The unchanged regions around `diffs`: one entry before, between and
    /// after the diffs, possibly empty. `seq1_len` is the length of the
    /// first sequence.
    pub fn invert(diffs: &[SequenceDiff], seq1_len: usize) -> Vec<SequenceDiff> {
        let mut result = Vec::with_capacity(diffs.len() + 1);
        for i in 0..=diffs.len() {
            let previous = i.checked_sub(1).map(|p| &diffs[p]);
            let start = previous.map_or(OffsetPair::ZERO, SequenceDiff::end_exclusives);
            let end = match diffs.get(i) {
                Some(next) => next.starts(),
                None => {
                    // Past the last diff both sides advance in lockstep.
                    let offset2 = match previous {
                        Some(p) => seq1_len + p.seq2_range.end_exclusive - p.seq1_range.end_exclusive,
                        None => seq1_len,
                    };
                    OffsetPair::new(seq1_len, offset2)
                }
            };
            result.push(SequenceDiff::from_offset_pairs(start, end));
        }
        result
    }
}

impl fmt::Display for SequenceDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.seq1_range, self.seq2_range)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffAlgorithmResult {
    pub diffs: Vec<SequenceDiff>,
    /// The search was cancelled and `diffs` is the trivial replacement.
    pub hit_timeout: bool,
}

impl DiffAlgorithmResult {
    pub fn new(diffs: Vec<SequenceDiff>, hit_timeout: bool) -> Self {
        Self { diffs, hit_timeout }
    }

    /// Everything in the first sequence replaced by everything in the second.
    /// Two empty sequences have nothing to replace.
    pub fn trivial(len1: usize, len2: usize) -> Self {
        if len1 == 0 && len2 == 0 {
            return Self::new(Vec::new(), false);
        }
        Self::new(vec![Self::whole(len1, len2)], false)
    }

    pub fn trivial_timed_out(len1: usize, len2: usize) -> Self {
        Self::new(vec![Self::whole(len1, len2)], true)
    }

    fn whole(len1: usize, len2: usize) -> SequenceDiff {
        SequenceDiff::new(OffsetRange::of_length(len1), OffsetRange::of_length(len2))
    }

    pub fn is_identical(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Elements of each sequence covered by the diffs.
    pub fn replaced_lengths(&self) -> (usize, usize) {
        self.diffs.iter().fold((0, 0), |(a, b), diff| {
            (a + diff.seq1_range.len(), b + diff.seq2_range.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(a: (usize, usize), b: (usize, usize)) -> SequenceDiff {
        SequenceDiff::new(OffsetRange::new(a.0, a.1), OffsetRange::new(b.0, b.1))
    }

    #[test]
    fn invert_yields_unchanged_regions() {
        let diffs = [diff((1, 2), (1, 3)), diff((4, 4), (5, 6))];
        assert_eq!(
            SequenceDiff::invert(&diffs, 6),
            vec![diff((0, 1), (0, 1)), diff((2, 4), (3, 5)), diff((4, 6), (6, 8))]
        );
        assert_eq!(SequenceDiff::invert(&[], 3), vec![diff((0, 3), (0, 3))]);
    }

    #[test]
    fn swap_and_join() {
        let a = diff((1, 2), (3, 5));
        let b = diff((4, 6), (7, 7));
        assert_eq!(a.swap(), diff((3, 5), (1, 2)));
        assert_eq!(a.join(&b), diff((1, 6), (3, 7)));
        assert_eq!(a.to_string(), "[1, 2) -> [3, 5)");
    }

    #[test]
    fn trivial_results() {
        assert!(DiffAlgorithmResult::trivial(0, 0).is_identical());
        assert_eq!(DiffAlgorithmResult::trivial(0, 3).diffs, vec![diff((0, 0), (0, 3))]);
        let timed_out = DiffAlgorithmResult::trivial_timed_out(2, 3);
        assert!(timed_out.hit_timeout);
        assert_eq!(timed_out.replaced_lengths(), (2, 3));
    }
}
