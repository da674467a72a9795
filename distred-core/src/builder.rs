//! Builder utilities for configuring reducers.
//!
//! Exposes the execution strategy selection surface and the validation that
//! runs before any worker thread or rank is started.

use std::num::NonZeroUsize;

use crate::{
    Result,
    engine::Reducer,
    error::ReduceError,
    reducer::{DataLayout, ThreadModel},
};

/// Selects which reduction strategy a [`Reducer`] dispatches to.
///
/// # Examples
/// ```
/// use distred_core::ExecutionStrategy;
///
/// assert_eq!(ExecutionStrategy::default(), ExecutionStrategy::Sequential);
/// assert_eq!(ExecutionStrategy::Distributed.as_str(), "distributed");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Fold the whole vector on the calling thread.
    #[default]
    Sequential,
    /// Fold partitions on worker threads that share the input vectors.
    SharedMemory,
    /// Fold partitions on ranks that only exchange messages.
    Distributed,
}

impl ExecutionStrategy {
    /// Stable label used in logs, metrics and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::SharedMemory => "shared-memory",
            Self::Distributed => "distributed",
        }
    }
}

/// Configures and constructs [`Reducer`] instances.
///
/// # Examples
/// ```
/// use distred_core::{DistanceReducer, ExecutionStrategy, ReducerBuilder};
///
/// let reducer = ReducerBuilder::new()
///     .with_strategy(ExecutionStrategy::SharedMemory)
///     .with_workers(4)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(reducer.workers().get(), 4);
/// assert_eq!(reducer.strategy(), ExecutionStrategy::SharedMemory);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducerBuilder {
    strategy: ExecutionStrategy,
    workers: usize,
    thread_model: ThreadModel,
    layout: DataLayout,
}

impl Default for ReducerBuilder {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::Sequential,
            workers: 1,
            thread_model: ThreadModel::ForkJoin,
            layout: DataLayout::Replicated,
        }
    }
}

impl ReducerBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use distred_core::{ExecutionStrategy, ReducerBuilder};
    ///
    /// let builder = ReducerBuilder::new();
    /// assert_eq!(builder.workers(), 1);
    /// assert_eq!(builder.strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategy to dispatch to.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns the configured strategy.
    #[must_use]
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Overrides the number of worker threads or ranks.
    ///
    /// The sequential strategy validates but otherwise ignores this value.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Selects how shared-memory workers are scheduled.
    #[must_use]
    pub fn with_thread_model(mut self, model: ThreadModel) -> Self {
        self.thread_model = model;
        self
    }

    /// Returns the configured thread model.
    #[must_use]
    pub fn thread_model(&self) -> ThreadModel {
        self.thread_model
    }

    /// Selects how distributed ranks receive their inputs.
    #[must_use]
    pub fn with_layout(mut self, layout: DataLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Returns the configured data layout.
    #[must_use]
    pub fn layout(&self) -> DataLayout {
        self.layout
    }

    /// Validates the configuration and constructs a [`Reducer`].
    ///
    /// # Errors
    /// - [`ReduceError::InvalidWorkerCount`] when the worker count is zero.
    /// - [`ReduceError::WorkerSpawn`] when threads or ranks cannot be started.
    ///
    /// # Examples
    /// ```
    /// use distred_core::{ReduceError, ReducerBuilder};
    ///
    /// let err = ReducerBuilder::new().with_workers(0).build().unwrap_err();
    /// assert_eq!(err, ReduceError::InvalidWorkerCount { got: 0 });
    /// ```
    pub fn build(&self) -> Result<Reducer> {
        let workers = NonZeroUsize::new(self.workers).ok_or(ReduceError::InvalidWorkerCount {
            got: self.workers,
        })?;
        Reducer::new(self.strategy, workers, self.thread_model, self.layout)
    }
}
