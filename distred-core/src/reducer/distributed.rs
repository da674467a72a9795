//! Message-passing reducer backed by a [`ProcessGroup`].

use std::num::NonZeroUsize;

use tracing::instrument;

use super::{DataLayout, DistanceReducer, ProcessGroup};
use crate::{Result, distance::Distance, vectors::VectorPair};

/// Reducer whose ranks exchange inputs and partial sums only through messages.
///
/// Rank 0 is the caller. The group is started once and reused for every
/// reduction, so repeated runs measure the collective rather than rank
/// start-up.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use distred_core::{DataLayout, DistanceReducer, DistributedReducer, VectorPair};
///
/// let ranks = NonZeroUsize::new(4).expect("non-zero");
/// let reducer = DistributedReducer::new(ranks, DataLayout::Replicated)?;
/// let pair = VectorPair::new(vec![1.0; 9], vec![1.0; 9])?;
/// assert_eq!(reducer.reduce(&pair)?.value(), 0.0);
/// # Ok::<(), distred_core::ReduceError>(())
/// ```
#[derive(Debug)]
pub struct DistributedReducer {
    group: ProcessGroup,
    layout: DataLayout,
}

impl DistributedReducer {
    /// Starts `ranks` ranks that receive their inputs according to `layout`.
    ///
    /// # Errors
    /// Returns [`crate::ReduceError::WorkerSpawn`] when a rank cannot be
    /// started.
    pub fn new(ranks: NonZeroUsize, layout: DataLayout) -> Result<Self> {
        Ok(Self {
            group: ProcessGroup::spawn(ranks)?,
            layout,
        })
    }

    /// Returns the data layout used for broadcasts.
    #[must_use]
    pub const fn layout(&self) -> DataLayout {
        self.layout
    }
}

impl DistanceReducer for DistributedReducer {
    fn name(&self) -> &'static str {
        "distributed"
    }

    fn workers(&self) -> NonZeroUsize {
        self.group.size()
    }

    #[instrument(
        name = "core.reduce_distributed",
        err,
        skip_all,
        fields(len = pair.len(), ranks = self.group.size().get()),
    )]
    fn reduce(&self, pair: &VectorPair) -> Result<Distance> {
        Ok(self.group.reduce_sum(pair, self.layout)?.into_distance())
    }
}
