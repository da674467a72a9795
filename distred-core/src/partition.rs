//! Contiguous work partitioning for parallel reductions.
//!
//! A vector of length `n` is split into `w` contiguous ranges of `⌊n/w⌋`
//! elements; the final range absorbs the `n mod w` remainder. Ranges are
//! disjoint, ordered, and cover `[0, n)` exactly once, so each index is folded
//! by exactly one worker.

use std::{num::NonZeroUsize, ops::Range};

/// Half-open index range `[start, end)` owned by a single worker.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use distred_core::Partition;
///
/// let workers = NonZeroUsize::new(3).expect("non-zero");
/// let last = Partition::for_worker(10, workers, 2);
/// assert_eq!((last.start(), last.end()), (6, 10));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Partition {
    start: usize,
    end: usize,
}

impl Partition {
    /// Computes the range assigned to worker `index` out of `workers` for a
    /// vector of length `len`.
    ///
    /// Indices at or beyond `workers` yield an empty range positioned at
    /// `len`.
    #[must_use]
    pub fn for_worker(len: usize, workers: NonZeroUsize, index: usize) -> Self {
        let count = workers.get();
        if index >= count {
            return Self {
                start: len,
                end: len,
            };
        }
        let chunk = len / count;
        let start = chunk * index;
        let end = if index + 1 == count {
            len
        } else {
            start + chunk
        };
        Self { start, end }
    }

    /// First index covered by the range.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last index covered by the range.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of indices covered by the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` when the range covers no indices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Converts the partition into a slice range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Borrows the part of `values` covered by this partition.
    ///
    /// Returns an empty slice when the partition lies outside `values`.
    #[must_use]
    pub fn slice<'a>(&self, values: &'a [f64]) -> &'a [f64] {
        values.get(self.range()).unwrap_or_default()
    }
}

/// Splits `[0, len)` into `workers` contiguous partitions.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use distred_core::partition;
///
/// let parts = partition(10, NonZeroUsize::new(4).expect("non-zero"));
/// let sizes: Vec<_> = parts.iter().map(|p| p.len()).collect();
/// assert_eq!(sizes, vec![2, 2, 2, 4]);
/// ```
#[must_use]
pub fn partition(len: usize, workers: NonZeroUsize) -> Vec<Partition> {
    (0..workers.get())
        .map(|index| Partition::for_worker(len, workers, index))
        .collect()
}

/// Checks that `parts` are ordered, disjoint and cover `[0, len)` exactly.
#[must_use]
pub fn covers_exactly(parts: &[Partition], len: usize) -> bool {
    let mut cursor = 0;
    for part in parts {
        if part.start != cursor || part.end < part.start {
            return false;
        }
        cursor = part.end;
    }
    cursor == len
}


#[cfg(kani)]
mod kani_proofs {
    use std::num::NonZeroUsize;

    use super::Partition;

    /// Verifies that adjacent partitions meet without gaps or overlap.
    #[kani::proof]
    fn verify_adjacent_partitions_meet() {
        let len: usize = kani::any();
        let count: usize = kani::any();
        let index: usize = kani::any();
        kani::assume(len <= 1 << 20);
        kani::assume(count > 1 && count <= 64);
        kani::assume(index + 1 < count);

        let workers = NonZeroUsize::new(count).expect("assumed non-zero");
        let current = Partition::for_worker(len, workers, index);
        let next = Partition::for_worker(len, workers, index + 1);
        kani::assert(current.end() == next.start(), "partitions must be contiguous");
    }

    /// Verifies that the final partition always ends at the vector length.
    #[kani::proof]
    fn verify_last_partition_reaches_len() {
        let len: usize = kani::any();
        let count: usize = kani::any();
        kani::assume(len <= 1 << 20);
        kani::assume(count > 0 && count <= 64);

        let workers = NonZeroUsize::new(count).expect("assumed non-zero");
        let last = Partition::for_worker(len, workers, count - 1);
        kani::assert(last.end() == len, "last partition must absorb the remainder");
    }
}
