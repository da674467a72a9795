//! Benchmark harness for timing repeated reductions.
//!
//! A [`Benchmark`] carries every knob explicitly: vector length, run count,
//! seeding, value range, and whether vectors are regenerated before each run.
//! Only the reduction itself is timed; generation and verification happen
//! outside the measured window.

mod report;

use std::{num::NonZeroUsize, time::Instant};

use tracing::{info, instrument};

pub use self::report::{BenchmarkReport, RunRecord, Verification};

use crate::{
    Result,
    builder::ReducerBuilder,
    distance::{Distance, euclidean_distance, relative_error},
    error::ReduceError,
    reducer::DistanceReducer,
    vectors::{GeneratorConfig, SeedPolicy, ValueRange, VectorPair},
};

/// Number of timed runs when none is configured.
pub const DEFAULT_RUNS: usize = 10;

/// Worker counts swept when none are configured.
pub const DEFAULT_SWEEP: [usize; 4] = [2, 4, 8, 16];

/// Configures and validates a [`Benchmark`].
///
/// # Examples
/// ```
/// use distred_core::{BenchmarkBuilder, SeedPolicy};
///
/// let benchmark = BenchmarkBuilder::new(1_000)
///     .with_runs(3)
///     .with_seed(SeedPolicy::Fixed(42))
///     .build()?;
/// assert_eq!(benchmark.runs().get(), 3);
/// assert_eq!(benchmark.len().get(), 1_000);
/// # Ok::<(), distred_core::ReduceError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchmarkBuilder {
    len: usize,
    runs: usize,
    seed: SeedPolicy,
    values: ValueRange,
    regenerate_each_run: bool,
    verify: bool,
}

impl BenchmarkBuilder {
    /// Creates a builder for vectors of `len` elements.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            runs: DEFAULT_RUNS,
            seed: SeedPolicy::Entropy,
            values: ValueRange::UnitInterval,
            regenerate_each_run: false,
            verify: true,
        }
    }

    /// Overrides the number of timed runs.
    #[must_use]
    pub const fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Overrides the seeding policy.
    #[must_use]
    pub const fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the range generated values are drawn from.
    #[must_use]
    pub const fn with_values(mut self, values: ValueRange) -> Self {
        self.values = values;
        self
    }

    /// Regenerates the vectors before every run instead of once up front.
    #[must_use]
    pub const fn regenerate_each_run(mut self, enabled: bool) -> Self {
        self.regenerate_each_run = enabled;
        self
    }

    /// Enables or disables comparison against the sequential oracle.
    #[must_use]
    pub const fn verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// - [`ReduceError::InvalidVectorLength`] when the length is zero.
    /// - [`ReduceError::InvalidRunCount`] when the run count is zero.
    pub fn build(&self) -> Result<Benchmark> {
        let len = NonZeroUsize::new(self.len)
            .ok_or(ReduceError::InvalidVectorLength { got: self.len })?;
        let runs =
            NonZeroUsize::new(self.runs).ok_or(ReduceError::InvalidRunCount { got: self.runs })?;
        Ok(Benchmark {
            generator: GeneratorConfig::new(len)
                .with_seed(self.seed)
                .with_values(self.values),
            runs,
            regenerate_each_run: self.regenerate_each_run,
            verify: self.verify,
        })
    }
}

/// Validated benchmark configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Benchmark {
    generator: GeneratorConfig,
    runs: NonZeroUsize,
    regenerate_each_run: bool,
    verify: bool,
}

impl Benchmark {
    /// Vector length.
    #[must_use]
    pub const fn len(&self) -> NonZeroUsize {
        self.generator.len
    }

    /// Number of timed runs.
    #[must_use]
    pub const fn runs(&self) -> NonZeroUsize {
        self.runs
    }

    /// Generator settings used for the vectors.
    #[must_use]
    pub const fn generator(&self) -> GeneratorConfig {
        self.generator
    }

    /// Whether runs are compared against the sequential oracle.
    #[must_use]
    pub const fn verifies(&self) -> bool {
        self.verify
    }

    /// Generates the vectors for the first run.
    ///
    /// # Errors
    /// Returns [`ReduceError::AllocationFailed`] when storage cannot be
    /// reserved.
    pub fn generate(&self) -> Result<VectorPair> {
        VectorPair::generate(&self.generator)
    }

    /// Generates vectors and times `runs` reductions with `reducer`.
    ///
    /// # Errors
    /// Propagates generation and reduction failures.
    ///
    /// # Examples
    /// ```
    /// use distred_core::{BenchmarkBuilder, SeedPolicy, SequentialReducer};
    ///
    /// let benchmark = BenchmarkBuilder::new(64)
    ///     .with_runs(2)
    ///     .with_seed(SeedPolicy::Fixed(7))
    ///     .build()?;
    /// let report = benchmark.run(&SequentialReducer)?;
    /// assert_eq!(report.runs().len(), 2);
    /// assert!(report.verification().is_some_and(|v| v.is_within_tolerance()));
    /// # Ok::<(), distred_core::ReduceError>(())
    /// ```
    pub fn run(&self, reducer: &dyn DistanceReducer) -> Result<BenchmarkReport> {
        let pair = self.generate()?;
        self.run_on(reducer, pair)
    }

    /// Times `runs` reductions of `pair` with `reducer`.
    ///
    /// When regeneration is enabled, `pair` is used for the first run only.
    ///
    /// # Errors
    /// Propagates generation and reduction failures.
    #[instrument(
        name = "core.benchmark",
        err,
        skip_all,
        fields(
            strategy = reducer.name(),
            workers = reducer.workers().get(),
            len = pair.len(),
            runs = self.runs.get(),
        ),
    )]
    pub fn run_on(
        &self,
        reducer: &dyn DistanceReducer,
        mut pair: VectorPair,
    ) -> Result<BenchmarkReport> {
        let mut records = Vec::with_capacity(self.runs.get());
        let mut oracle: Option<Distance> = None;
        let mut worst = 0.0_f64;

        for run in 1..=self.runs.get() {
            if self.regenerate_each_run && run > 1 {
                let seed = self.generator.seed.for_run(run as u64 - 1);
                pair = VectorPair::generate(&self.generator.with_seed(seed))?;
                oracle = None;
            }

            let started = Instant::now();
            let distance = reducer.reduce(&pair)?;
            let elapsed = started.elapsed();

            if self.verify {
                let expected = match oracle {
                    Some(expected) => expected,
                    None => euclidean_distance(pair.left(), pair.right())?,
                };
                worst = worst.max(relative_error(distance.value(), expected.value()));
                oracle = Some(expected);
            }

            info!(
                run,
                distance = distance.value(),
                elapsed_secs = elapsed.as_secs_f64(),
                "run completed"
            );
            records.push(RunRecord {
                run,
                distance,
                elapsed,
            });
        }

        let verification = oracle.map(|expected| Verification::new(expected, worst));
        Ok(BenchmarkReport::new(
            reducer.name(),
            reducer.workers(),
            pair.len(),
            records,
            verification,
        ))
    }

    /// Runs the benchmark once per worker count on the same vectors.
    ///
    /// Every worker count is validated before any vector is generated.
    ///
    /// # Errors
    /// - [`ReduceError::EmptySweep`] when `workers` is empty.
    /// - [`ReduceError::InvalidWorkerCount`] when any count is zero.
    /// - Any generation, spawn or reduction failure.
    #[instrument(name = "core.sweep", err, skip_all, fields(counts = ?workers))]
    pub fn sweep(
        &self,
        builder: &ReducerBuilder,
        workers: &[usize],
    ) -> Result<Vec<BenchmarkReport>> {
        if workers.is_empty() {
            return Err(ReduceError::EmptySweep);
        }
        if let Some(&got) = workers.iter().find(|&&count| count == 0) {
            return Err(ReduceError::InvalidWorkerCount { got });
        }

        let pair = self.generate()?;
        workers
            .iter()
            .map(|&count| {
                let reducer = builder.clone().with_workers(count).build()?;
                self.run_on(&reducer, pair.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
