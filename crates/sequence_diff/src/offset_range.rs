use std::fmt;

/// A half-open range `[start, end_exclusive)` of sequence indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OffsetRange {
    pub start: usize,
    pub end_exclusive: usize,
}

impl OffsetRange {
    pub fn new(start: usize, end_exclusive: usize) -> Self {
        debug_assert!(start <= end_exclusive, "invalid range {start}..{end_exclusive}");
        Self {
            start,
            end_exclusive,
        }
    }

    pub fn empty_at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn of_length(length: usize) -> Self {
        Self::new(0, length)
    }

    pub fn of_start_and_length(start: usize, length: usize) -> Self {
        Self::new(start, start + length)
    }

    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end_exclusive
    }

    /// Shifts both ends by `offset`, saturating at zero.
    pub fn delta(&self, offset: isize) -> Self {
        Self::new(
            self.start.saturating_add_signed(offset),
            self.end_exclusive.saturating_add_signed(offset),
        )
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end_exclusive
    }

    pub fn contains_range(&self, other: &OffsetRange) -> bool {
        self.start <= other.start && other.end_exclusive <= self.end_exclusive
    }

    /// Smallest range covering both.
    pub fn join(&self, other: &OffsetRange) -> Self {
        Self::new(
            self.start.min(other.start),
            self.end_exclusive.max(other.end_exclusive),
        )
    }

    /// Overlap of the two ranges. Touching ranges intersect in an empty range.
    pub fn intersect(&self, other: &OffsetRange) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end_exclusive.min(other.end_exclusive);
        (start <= end).then(|| Self::new(start, end))
    }

    pub fn intersects_or_touches(&self, other: &OffsetRange) -> bool {
        self.start.max(other.start) <= self.end_exclusive.min(other.end_exclusive)
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end_exclusive
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end_exclusive)
    }
}

impl From<std::ops::Range<usize>> for OffsetRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
