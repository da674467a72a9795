//! Seeded inputs and reducers for benchmarks.

use std::num::NonZeroUsize;

use distred_core::{GeneratorConfig, Reducer, ReducerBuilder, SeedPolicy, ThreadModel, VectorPair};

use crate::{error::BenchSetupError, params::ReduceBenchParams};

/// Seed used for every generated benchmark input.
pub const SEED: u64 = 42;

/// Generates a reproducible vector pair of `len` elements.
///
/// # Errors
/// Returns [`BenchSetupError::ZeroValue`] for a zero length and
/// [`BenchSetupError::Reduce`] when storage cannot be reserved.
///
/// # Examples
/// ```
/// use distred_benches::inputs::seeded_pair;
///
/// let first = seeded_pair(8)?;
/// let second = seeded_pair(8)?;
/// assert_eq!(first, second);
/// # Ok::<(), distred_benches::error::BenchSetupError>(())
/// ```
pub fn seeded_pair(len: usize) -> Result<VectorPair, BenchSetupError> {
    let length = NonZeroUsize::new(len).ok_or(BenchSetupError::ZeroValue {
        context: "vector length",
    })?;
    let config = GeneratorConfig::new(length).with_seed(SeedPolicy::Fixed(SEED));
    Ok(VectorPair::generate(&config)?)
}

/// Builds the reducer described by `params`, using fork-join threads for the
/// shared-memory strategy.
///
/// # Errors
/// Returns [`BenchSetupError::Reduce`] when the worker count is zero or
/// workers cannot be started.
pub fn reducer_for(params: &ReduceBenchParams) -> Result<Reducer, BenchSetupError> {
    let reducer = ReducerBuilder::new()
        .with_strategy(params.strategy)
        .with_workers(params.workers)
        .with_thread_model(ThreadModel::ForkJoin)
        .build()?;
    Ok(reducer)
}
