use tracing::{debug, trace};

use crate::offset_range::OffsetRange;
use crate::result::{DiffAlgorithmResult, SequenceDiff};
use crate::sequence::Sequence;
use crate::timeout::Timeout;
use crate::{DiffAlgorithm, EqualityScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Skip an element of the first sequence.
    Horizontal,
    /// Skip an element of the second sequence.
    Vertical,
    Diagonal,
}

/// Quadratic LCS table. Diagonal steps that extend a running match earn a
/// bonus equal to the run length, so contiguous matches beat scattered ones
/// of the same size. The result is therefore not always a minimal script.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicProgrammingDiff;

impl DiffAlgorithm for DynamicProgrammingDiff {
    fn compute_with<S1, S2>(
        &self,
        seq1: &S1,
        seq2: &S2,
        timeout: &dyn Timeout,
        equality_score: Option<EqualityScore<'_>>,
    ) -> DiffAlgorithmResult
    where
        S1: Sequence + ?Sized,
        S2: Sequence<Element = S1::Element> + ?Sized,
    {
        let (n, m) = (seq1.len(), seq2.len());
        if n == 0 || m == 0 {
            return DiffAlgorithmResult::trivial(n, m);
        }

        let at = |i: usize, j: usize| i * m + j;
        let mut lcs = vec![0.0_f64; n * m];
        let mut directions = vec![Direction::Horizontal; n * m];
        let mut run_lengths = vec![0_usize; n * m];

        for i in 0..n {
            for j in 0..m {
                if !timeout.is_valid() {
                    debug!(len1 = n, len2 = m, "dynamic programming diff timed out");
                    return DiffAlgorithmResult::trivial_timed_out(n, m);
                }

                let horizontal = if i == 0 { 0.0 } else { lcs[at(i - 1, j)] };
                let vertical = if j == 0 { 0.0 } else { lcs[at(i, j - 1)] };

                let diagonal = if seq1.element_at(i) == seq2.element_at(j) {
                    let mut value = if i == 0 || j == 0 { 0.0 } else { lcs[at(i - 1, j - 1)] };
                    if i > 0 && j > 0 && directions[at(i - 1, j - 1)] == Direction::Diagonal {
                        value += run_lengths[at(i - 1, j - 1)] as f64;
                    }
                    value + equality_score.map_or(1.0, |score| score(i, j))
                } else {
                    -1.0
                };

                let mut best = horizontal;
                let mut direction = Direction::Horizontal;
                if vertical > best {
                    best = vertical;
                    direction = Direction::Vertical;
                }
                if diagonal > best {
                    best = diagonal;
                    direction = Direction::Diagonal;
                }

                let cell = at(i, j);
                lcs[cell] = best;
                directions[cell] = direction;
                run_lengths[cell] = if direction == Direction::Diagonal {
                    let previous = if i > 0 && j > 0 { run_lengths[at(i - 1, j - 1)] } else { 0 };
                    previous + 1
                } else {
                    0
                };
            }
        }

        // Walk back from the last cell. Every matched cell closes the gap
        // between itself and the previous match.
        let mut diffs = Vec::new();
        let (mut last1, mut last2) = (n, m);
        let mut flush = |end1: usize, end2: usize, last1: usize, last2: usize| {
            if end1 != last1 || end2 != last2 {
                diffs.push(SequenceDiff::new(
                    OffsetRange::new(end1, last1),
                    OffsetRange::new(end2, last2),
                ));
            }
        };

        let (mut i, mut j) = (n, m);
        while i > 0 && j > 0 {
            match directions[at(i - 1, j - 1)] {
                Direction::Diagonal => {
                    flush(i, j, last1, last2);
                    i -= 1;
                    j -= 1;
                    last1 = i;
                    last2 = j;
                }
                Direction::Horizontal => i -= 1,
                Direction::Vertical => j -= 1,
            }
        }
        flush(0, 0, last1, last2);

        diffs.reverse();
        trace!(len1 = n, len2 = m, diffs = diffs.len(), "dynamic programming diff");
        DiffAlgorithmResult::new(diffs, false)
    }
}
