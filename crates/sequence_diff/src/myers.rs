use tracing::{debug, trace};

use crate::offset_range::OffsetRange;
use crate::result::{DiffAlgorithmResult, SequenceDiff};
use crate::sequence::Sequence;
use crate::timeout::Timeout;
use crate::{DiffAlgorithm, EqualityScore};

/// Greedy O(ND) shortest edit script search. The equality score is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersDiff;

/// Indexed by diagonal number `k = x - y`, which may be negative. Unset
/// entries read as `T::default()`.
#[derive(Debug)]
struct DiagonalArray<T> {
    non_negative: Vec<T>,
    negative: Vec<T>,
}

impl<T: Copy + Default> DiagonalArray<T> {
    fn new() -> Self {
        Self {
            non_negative: Vec::new(),
            negative: Vec::new(),
        }
    }

    fn slot(&mut self, k: isize) -> &mut T {
        let (values, index) = if k < 0 {
            (&mut self.negative, (-k - 1) as usize)
        } else {
            (&mut self.non_negative, k as usize)
        };
        if index >= values.len() {
            values.resize(index + 1, T::default());
        }
        &mut values[index]
    }

    fn get(&self, k: isize) -> T {
        let value = if k < 0 {
            self.negative.get((-k - 1) as usize)
        } else {
            self.non_negative.get(k as usize)
        };
        value.copied().unwrap_or_default()
    }

    fn set(&mut self, k: isize, value: T) {
        *self.slot(k) = value;
    }
}

/// One snake on the way to the end point, linked to the snake before it.
#[derive(Debug, Clone, Copy)]
struct SnakePath {
    previous: Option<usize>,
    x: usize,
    y: usize,
    length: usize,
}

impl DiffAlgorithm for MyersDiff {
    fn compute_with<S1, S2>(
        &self,
        seq1: &S1,
        seq2: &S2,
        timeout: &dyn Timeout,
        _equality_score: Option<EqualityScore<'_>>,
    ) -> DiffAlgorithmResult
    where
        S1: Sequence + ?Sized,
        S2: Sequence<Element = S1::Element> + ?Sized,
    {
        let (n, m) = (seq1.len(), seq2.len());
        if n == 0 || m == 0 {
            return DiffAlgorithmResult::trivial(n, m);
        }

        // A point left of the second sequence's start never matches.
        let snake_end = |mut x: usize, y: isize| {
            if y < 0 {
                return x;
            }
            let mut y = y as usize;
            while x < n && y < m && seq1.element_at(x) == seq2.element_at(y) {
                x += 1;
                y += 1;
            }
            x
        };

        let mut arena: Vec<SnakePath> = Vec::new();
        let mut furthest: DiagonalArray<usize> = DiagonalArray::new();
        let mut paths: DiagonalArray<Option<usize>> = DiagonalArray::new();

        let first = snake_end(0, 0);
        furthest.set(0, first);
        if first > 0 {
            arena.push(SnakePath {
                previous: None,
                x: 0,
                y: 0,
                length: first,
            });
            paths.set(0, Some(0));
        }

        let (n_i, m_i) = (n as isize, m as isize);
        let mut end_diagonal = 0_isize;
        let mut d = 0_isize;
        'search: while !(first == n && n == m) {
            d += 1;
            if !timeout.is_valid() {
                debug!(len1 = n, len2 = m, d, "myers diff timed out");
                return DiffAlgorithmResult::trivial_timed_out(n, m);
            }

            let lower = -d.min(m_i + d % 2);
            let upper = d.min(n_i + d % 2);
            let mut k = lower;
            while k <= upper {
                let top = if k == upper { -1 } else { furthest.get(k + 1) as isize };
                let left = if k == lower { -1 } else { furthest.get(k - 1) as isize + 1 };
                let x = top.max(left).min(n_i);
                let y = x - k;
                if x > n_i || y > m_i {
                    k += 2;
                    continue;
                }

                let x = x as usize;
                let new_x = snake_end(x, y);
                furthest.set(k, new_x);

                let last_path = if x as isize == top {
                    paths.get(k + 1)
                } else {
                    paths.get(k - 1)
                };
                let path = if new_x != x {
                    arena.push(SnakePath {
                        previous: last_path,
                        x,
                        y: y as usize,
                        length: new_x - x,
                    });
                    Some(arena.len() - 1)
                } else {
                    last_path
                };
                paths.set(k, path);

                if new_x == n && new_x as isize - k == m_i {
                    end_diagonal = k;
                    break 'search;
                }
                k += 2;
            }
        }

        let mut diffs = Vec::new();
        let (mut last1, mut last2) = (n, m);
        let mut path = paths.get(end_diagonal).map(|index| arena[index]);
        loop {
            let (end1, end2) = path.map_or((0, 0), |p| (p.x + p.length, p.y + p.length));
            if end1 != last1 || end2 != last2 {
                diffs.push(SequenceDiff::new(
                    OffsetRange::new(end1, last1),
                    OffsetRange::new(end2, last2),
                ));
            }
            let Some(snake) = path else {
                break;
            };
            last1 = snake.x;
            last2 = snake.y;
            path = snake.previous.map(|index| arena[index]);
        }

        diffs.reverse();
        trace!(len1 = n, len2 = m, diffs = diffs.len(), "myers diff");
        DiffAlgorithmResult::new(diffs, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_array_reads_default_when_unset() {
        let mut array: DiagonalArray<usize> = DiagonalArray::new();
        array.set(-3, 7);
        array.set(2, 5);
        assert_eq!(array.get(-3), 7);
        assert_eq!(array.get(2), 5);
        assert_eq!(array.get(-1), 0);
        assert_eq!(array.get(10), 0);
    }
}
