//! Edit scripts between two sequences.
//!
//! Two interchangeable longest-common-subsequence searches share one
//! contract: [`DynamicProgrammingDiff`] (quadratic, can weight matches) and
//! [`MyersDiff`] (O(ND), minimal). Both poll a [`Timeout`] and fall back to
//! the trivial "replace everything" result when it expires.

mod dynamic_programming;
mod myers;
mod offset_range;
mod result;
mod sequence;
mod timeout;

pub use dynamic_programming::DynamicProgrammingDiff;
pub use myers::MyersDiff;
pub use offset_range::OffsetRange;
pub use result::{DiffAlgorithmResult, OffsetPair, SequenceDiff};
pub use sequence::{CharSequence, LineInterner, LineSequence, Sequence, line_equality_score};
pub use timeout::{CancellationFlag, DateTimeout, InfiniteTimeout, Timeout};

/// Weight of matching element `i` of the first sequence with element `j` of
/// the second. Only called for equal elements.
pub type EqualityScore<'a> = &'a dyn Fn(usize, usize) -> f64;

/// Below this many elements in total, [`DiffAlgorithmKind::Auto`] uses
/// dynamic programming.
pub const AUTO_DYNAMIC_PROGRAMMING_LIMIT: usize = 1700;

pub trait DiffAlgorithm {
    fn compute_with<S1, S2>(
        &self,
        seq1: &S1,
        seq2: &S2,
        timeout: &dyn Timeout,
        equality_score: Option<EqualityScore<'_>>,
    ) -> DiffAlgorithmResult
    where
        S1: Sequence + ?Sized,
        S2: Sequence<Element = S1::Element> + ?Sized;

    /// Unbounded search with every match weighted `1.0`.
    fn compute<S1, S2>(&self, seq1: &S1, seq2: &S2) -> DiffAlgorithmResult
    where
        S1: Sequence + ?Sized,
        S2: Sequence<Element = S1::Element> + ?Sized,
    {
        self.compute_with(seq1, seq2, &InfiniteTimeout, None)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DiffAlgorithmKind {
    DynamicProgramming,
    Myers,
    /// Dynamic programming for small inputs, Myers otherwise.
    #[default]
    Auto,
}

impl DiffAlgorithmKind {
    /// The concrete algorithm to use for inputs of these lengths.
    pub fn resolve(self, len1: usize, len2: usize) -> Self {
        match self {
            Self::Auto if len1 + len2 < AUTO_DYNAMIC_PROGRAMMING_LIMIT => Self::DynamicProgramming,
            Self::Auto => Self::Myers,
            kind => kind,
        }
    }
}

impl DiffAlgorithm for DiffAlgorithmKind {
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
        match self.resolve(seq1.len(), seq2.len()) {
            Self::DynamicProgramming => {
                DynamicProgrammingDiff.compute_with(seq1, seq2, timeout, equality_score)
            }
            _ => MyersDiff.compute_with(seq1, seq2, timeout, equality_score),
        }
    }
}
