//! Partition-compute-combine reducers.
//!
//! Every reducer follows the same two phases: workers fold the squared
//! differences of their own [`Partition`] into a private [`PartialSum`], then a
//! single combine step merges all partials and takes one square root. The
//! combine refuses to produce a total until every partition has contributed.

mod distributed;
mod process_group;
mod sequential;
mod shared;

use std::num::NonZeroUsize;

pub use self::distributed::DistributedReducer;
pub use self::process_group::{DataLayout, ProcessGroup};
pub use self::sequential::SequentialReducer;
pub use self::shared::{SharedMemoryReducer, ThreadModel};

use crate::{
    Result,
    distance::{Distance, SumOfSquares, sum_squared_differences},
    error::ReduceError,
    partition::{Partition, covers_exactly},
    vectors::VectorPair,
};

/// Shared interface for every reduction strategy.
///
/// # Examples
/// ```
/// use distred_core::{DistanceReducer, SequentialReducer, VectorPair};
///
/// let pair = VectorPair::new(vec![0.0, 0.0], vec![3.0, 4.0])?;
/// let distance = SequentialReducer.reduce(&pair)?;
/// assert_eq!(distance.value(), 5.0);
/// # Ok::<(), distred_core::ReduceError>(())
/// ```
pub trait DistanceReducer {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Number of workers that fold partitions concurrently.
    fn workers(&self) -> NonZeroUsize;

    /// Computes the Euclidean distance between the two vectors of `pair`.
    ///
    /// # Errors
    /// Returns [`ReduceError`] when a worker cannot be started, disappears
    /// before contributing, or the combine does not observe every partial.
    fn reduce(&self, pair: &VectorPair) -> Result<Distance>;
}

/// Worker-local accumulation over one partition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartialSum {
    partition: Partition,
    value: f64,
}

impl PartialSum {
    /// Folds `left` and `right` over `partition`.
    #[must_use]
    pub fn compute(partition: Partition, left: &[f64], right: &[f64]) -> Self {
        let value = sum_squared_differences(partition.slice(left), partition.slice(right));
        Self { partition, value }
    }

    /// Wraps a partial that was folded over pre-sliced data.
    #[must_use]
    pub const fn from_parts(partition: Partition, value: f64) -> Self {
        Self { partition, value }
    }

    /// The range this partial covers.
    #[must_use]
    pub const fn partition(&self) -> Partition {
        self.partition
    }

    /// The accumulated squared differences.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

/// Merges partial sums into the combined total.
///
/// Partials may arrive in any order. The combine requires exactly `expected`
/// partials whose partitions cover `[0, len)` exactly once.
///
/// # Errors
/// Returns [`ReduceError::IncompleteCombine`] when a partial is missing,
/// duplicated, or the partitions leave a gap.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use distred_core::{PartialSum, combine, partition};
///
/// let left = [1.0, 2.0, 3.0];
/// let right = [1.0, 0.0, 0.0];
/// let parts = partition(3, NonZeroUsize::new(2).expect("non-zero"));
/// let partials: Vec<_> = parts
///     .into_iter()
///     .map(|p| PartialSum::compute(p, &left, &right))
///     .collect();
/// let total = combine(partials, 2, 3)?;
/// assert_eq!(total.value(), 13.0);
/// # Ok::<(), distred_core::ReduceError>(())
/// ```
pub fn combine(
    mut partials: Vec<PartialSum>,
    expected: usize,
    len: usize,
) -> Result<SumOfSquares> {
    if partials.len() != expected {
        return Err(ReduceError::IncompleteCombine {
            expected,
            received: partials.len(),
        });
    }

    partials.sort_by_key(|partial| (partial.partition.start(), partial.partition.end()));
    let parts: Vec<Partition> = partials.iter().map(PartialSum::partition).collect();
    if !covers_exactly(&parts, len) {
        return Err(ReduceError::IncompleteCombine {
            expected,
            received: distinct_partitions(&parts),
        });
    }

    let total = partials.iter().map(PartialSum::value).sum();
    Ok(SumOfSquares::from_raw(total))
}

fn distinct_partitions(sorted: &[Partition]) -> usize {
    let mut distinct: Vec<Partition> = sorted.to_vec();
    distinct.dedup();
    distinct.len()
}

#[cfg(feature = "metrics")]
pub(crate) fn record_reduction(strategy: &'static str, elapsed: std::time::Duration) {
    metrics::counter!("distred_reductions_total", "strategy" => strategy).increment(1);
    metrics::histogram!("distred_reduce_latency_seconds", "strategy" => strategy)
        .record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests;
