//! Single-pass reducer used as the baseline for every parallel strategy.

use std::num::NonZeroUsize;

use tracing::instrument;

use super::{DistanceReducer, PartialSum, combine};
use crate::{Result, distance::Distance, partition::Partition, vectors::VectorPair};

/// Folds the whole vector on the calling thread.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SequentialReducer;

impl DistanceReducer for SequentialReducer {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn workers(&self) -> NonZeroUsize {
        NonZeroUsize::MIN
    }

    #[instrument(name = "core.reduce_sequential", err, skip_all, fields(len = pair.len()))]
    fn reduce(&self, pair: &VectorPair) -> Result<Distance> {
        let whole = Partition::for_worker(pair.len(), NonZeroUsize::MIN, 0);
        let partial = PartialSum::compute(whole, pair.left(), pair.right());
        Ok(combine(vec![partial], 1, pair.len())?.into_distance())
    }
}
