//! Map sequence intervals (i, j) onto flat triangular arrays

use crate::error::{FoldError, FoldResult};


/// Longest sequence whose squared length still fits an `i32`.
///
/// Sequences of this length or longer are rejected before any index
/// arithmetic is attempted.
pub const INDEX_LIMIT: usize = i32::MAX.isqrt() as usize;

/// Which of the two triangular orders a table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    RowMajor,
    ColMajor,
}

/// Row- and column-major offsets for the upper triangle 1 <= i <= j <= n.
///
/// Both orders are bijections onto `0..n * (n + 1) / 2`. Storage is sized
/// with [`TriIndex::triangular_size`], which leaves slack past the last
/// offset so that `n + 1` rows can always be addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriIndex {
    n: usize,
    /// - iindx[i]: row start, offset of (i, j) is iindx[i] - j
    iindx: Vec<usize>,
    /// - jindx[j]: column start, offset of (i, j) is jindx[j] + i - 1
    jindx: Vec<usize>,
}

impl TriIndex {
    /// Build the index tables for a sequence of length n.
    ///
    /// # Returns
    ///
    /// - [`FoldError::SequenceTooLong`] if `n >= INDEX_LIMIT`
    pub fn new(n: usize) -> FoldResult<Self> {
        check_length(n)?;

        let iindx = (0..=n)
            .map(|i| if i == 0 { 0 } else { ((n + 1 - i) * (n - i)) / 2 + n })
            .collect();
        let jindx = (0..=n).map(|j| (j * j.saturating_sub(1)) / 2).collect();

        Ok(Self { n, iindx, jindx })
    }

    /// Sequence length the tables were built for.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Offset of (i, j) in row-major order (rows of fixed i are contiguous).
    #[inline]
    pub fn row_major(&self, i: usize, j: usize) -> usize {
        debug_assert!(1 <= i && i <= j && j <= self.n, "({i}, {j}) not in 1..={}", self.n);
        self.iindx[i] - j
    }

    /// Offset of (i, j) in column-major order (columns of fixed j are contiguous).
    #[inline]
    pub fn col_major(&self, i: usize, j: usize) -> usize {
        debug_assert!(1 <= i && i <= j && j <= self.n, "({i}, {j}) not in 1..={}", self.n);
        self.jindx[j] + i - 1
    }

    /// Offset of (i, j) in the given order.
    #[inline]
    pub fn offset(&self, order: Order, i: usize, j: usize) -> usize {
        match order {
            Order::RowMajor => self.row_major(i, j),
            Order::ColMajor => self.col_major(i, j),
        }
    }

    /// Number of distinct intervals, n * (n + 1) / 2.
    pub fn cells(&self) -> usize {
        self.n * (self.n + 1) / 2
    }

    /// Slots in a triangular matrix, (n + 1) * (n + 2) / 2.
    pub fn triangular_size(&self) -> usize {
        (self.n + 1) * (self.n + 2) / 2
    }

    /// Slots in a linear (per position) array, n + 2.
    pub fn linear_size(&self) -> usize {
        self.n + 2
    }

    /// Every interval (i, j) with 1 <= i <= j <= n, row by row.
    pub fn intervals(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..=self.n).flat_map(move |i| (i..=self.n).map(move |j| (i, j)))
    }
}

/// Reject lengths whose square overflows an `i32`.
pub fn check_length(n: usize) -> FoldResult<()> {
    if n >= INDEX_LIMIT {
        return Err(FoldError::SequenceTooLong {
            length: n,
            max: INDEX_LIMIT - 1,
        });
    }
    Ok(())
}
