//! Strategy dispatch for configured reducers.

use std::num::NonZeroUsize;
#[cfg(feature = "metrics")]
use std::time::Instant;

use tracing::instrument;

use crate::{
    Result,
    builder::ExecutionStrategy,
    distance::Distance,
    reducer::{
        DataLayout, DistanceReducer, DistributedReducer, SequentialReducer, SharedMemoryReducer,
        ThreadModel,
    },
    vectors::VectorPair,
};

#[derive(Debug)]
enum Backend {
    Sequential(SequentialReducer),
    SharedMemory(SharedMemoryReducer),
    Distributed(DistributedReducer),
}

/// Reducer produced by [`crate::ReducerBuilder`].
///
/// Owns the worker pool or process group for its strategy, so repeated
/// reductions reuse the same workers.
#[derive(Debug)]
pub struct Reducer {
    strategy: ExecutionStrategy,
    backend: Backend,
}

impl Reducer {
    pub(crate) fn new(
        strategy: ExecutionStrategy,
        workers: NonZeroUsize,
        model: ThreadModel,
        layout: DataLayout,
    ) -> Result<Self> {
        let backend = match strategy {
            ExecutionStrategy::Sequential => Backend::Sequential(SequentialReducer),
            ExecutionStrategy::SharedMemory => {
                Backend::SharedMemory(SharedMemoryReducer::new(workers, model)?)
            }
            ExecutionStrategy::Distributed => {
                Backend::Distributed(DistributedReducer::new(workers, layout)?)
            }
        };
        Ok(Self { strategy, backend })
    }

    /// Returns the strategy this reducer dispatches to.
    #[must_use]
    pub const fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    fn inner(&self) -> &dyn DistanceReducer {
        match &self.backend {
            Backend::Sequential(reducer) => reducer,
            Backend::SharedMemory(reducer) => reducer,
            Backend::Distributed(reducer) => reducer,
        }
    }
}

impl DistanceReducer for Reducer {
    fn name(&self) -> &'static str {
        self.strategy.as_str()
    }

    fn workers(&self) -> NonZeroUsize {
        self.inner().workers()
    }

    #[instrument(
        name = "core.reduce",
        err,
        skip_all,
        fields(strategy = self.strategy.as_str(), workers = self.workers().get()),
    )]
    fn reduce(&self, pair: &VectorPair) -> Result<Distance> {
        #[cfg(feature = "metrics")]
        let started = Instant::now();
        let distance = self.inner().reduce(pair)?;
        #[cfg(feature = "metrics")]
        crate::reducer::record_reduction(self.strategy.as_str(), started.elapsed());
        Ok(distance)
    }
}
