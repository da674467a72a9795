//! Shared-memory reducer: worker threads fold disjoint slices of the same
//! in-memory vectors and meet at a single join barrier.

use std::{num::NonZeroUsize, sync::Arc, thread};

use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::{debug, instrument};

use super::{DistanceReducer, PartialSum, combine};
use crate::{
    Result,
    distance::Distance,
    error::ReduceError,
    partition::{Partition, partition},
    vectors::VectorPair,
};

/// How the shared-memory reducer schedules its workers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ThreadModel {
    /// A dedicated rayon pool folds the partitions as fork-join tasks.
    #[default]
    ForkJoin,
    /// One scoped OS thread per partition, joined at the barrier.
    Scoped,
}

/// Reducer that folds partitions concurrently inside one address space.
///
/// Input vectors are borrowed read-only by every worker; each worker owns a
/// private accumulator and the join is the only synchronisation point.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use distred_core::{DistanceReducer, SharedMemoryReducer, ThreadModel, VectorPair};
///
/// let workers = NonZeroUsize::new(2).expect("non-zero");
/// let reducer = SharedMemoryReducer::new(workers, ThreadModel::ForkJoin)?;
/// let pair = VectorPair::new(vec![0.0, 0.0, 0.0], vec![1.0, 2.0, 2.0])?;
/// assert_eq!(reducer.reduce(&pair)?.value(), 3.0);
/// # Ok::<(), distred_core::ReduceError>(())
/// ```
#[derive(Debug)]
pub struct SharedMemoryReducer {
    workers: NonZeroUsize,
    model: ThreadModel,
    pool: Option<ThreadPool>,
}

impl SharedMemoryReducer {
    /// Creates a reducer with `workers` threads scheduled by `model`.
    ///
    /// # Errors
    /// Returns [`ReduceError::WorkerSpawn`] when the fork-join pool cannot be
    /// built.
    pub fn new(workers: NonZeroUsize, model: ThreadModel) -> Result<Self> {
        let pool = match model {
            ThreadModel::ForkJoin => Some(build_pool(workers)?),
            ThreadModel::Scoped => None,
        };
        Ok(Self {
            workers,
            model,
            pool,
        })
    }

    /// Returns the scheduling model in use.
    #[must_use]
    pub const fn model(&self) -> ThreadModel {
        self.model
    }

    fn fold_fork_join(
        pool: &ThreadPool,
        parts: &[Partition],
        pair: &VectorPair,
    ) -> Vec<PartialSum> {
        let (left, right) = (pair.left(), pair.right());
        pool.install(|| {
            parts
                .par_iter()
                .map(|&part| PartialSum::compute(part, left, right))
                .collect()
        })
    }

    fn fold_scoped(parts: &[Partition], pair: &VectorPair) -> Result<Vec<PartialSum>> {
        let (left, right) = (pair.left(), pair.right());
        thread::scope(|scope| {
            let handles = parts
                .iter()
                .enumerate()
                .map(|(rank, &part)| {
                    thread::Builder::new()
                        .name(format!("distred-scoped-{rank}"))
                        .spawn_scoped(scope, move || PartialSum::compute(part, left, right))
                        .map_err(spawn_error)
                })
                .collect::<Result<Vec<_>>>()?;
            // All handles are joined before any outcome is inspected.
            let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
            joined
                .into_iter()
                .enumerate()
                .map(|(rank, outcome)| outcome.map_err(|_| ReduceError::WorkerLost { rank }))
                .collect()
        })
    }
}

impl DistanceReducer for SharedMemoryReducer {
    fn name(&self) -> &'static str {
        "shared-memory"
    }

    fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    #[instrument(
        name = "core.reduce_shared",
        err,
        skip_all,
        fields(len = pair.len(), workers = self.workers.get(), model = ?self.model),
    )]
    fn reduce(&self, pair: &VectorPair) -> Result<Distance> {
        let parts = partition(pair.len(), self.workers);
        let partials = match (&self.pool, self.model) {
            (Some(pool), ThreadModel::ForkJoin) => Self::fold_fork_join(pool, &parts, pair),
            _ => Self::fold_scoped(&parts, pair)?,
        };
        debug!(partials = partials.len(), "workers reached the combine barrier");
        Ok(combine(partials, self.workers.get(), pair.len())?.into_distance())
    }
}

fn build_pool(workers: NonZeroUsize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers.get())
        .thread_name(|index| format!("distred-worker-{index}"))
        .build()
        .map_err(spawn_error)
}

fn spawn_error(error: impl ToString) -> ReduceError {
    ReduceError::WorkerSpawn {
        reason: Arc::from(error.to_string()),
    }
}
