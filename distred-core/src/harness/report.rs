//! Timing and verification records produced by a benchmark.

use std::{num::NonZeroUsize, time::Duration};

use crate::distance::{Distance, RELATIVE_TOLERANCE};

/// Outcome of a single timed reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunRecord {
    /// One-based run index.
    pub run: usize,
    /// Distance returned by the reducer.
    pub distance: Distance,
    /// Wall-clock time spent inside the reduction.
    pub elapsed: Duration,
}

/// Comparison of reducer results against the sequential oracle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verification {
    oracle: Distance,
    max_relative_error: f64,
}

impl Verification {
    pub(crate) const fn new(oracle: Distance, max_relative_error: f64) -> Self {
        Self {
            oracle,
            max_relative_error,
        }
    }

    /// Oracle distance for the most recently measured vectors.
    #[must_use]
    pub const fn oracle(&self) -> Distance {
        self.oracle
    }

    /// Largest relative error observed across all runs.
    #[must_use]
    pub const fn max_relative_error(&self) -> f64 {
        self.max_relative_error
    }

    /// Returns `true` when every run agreed with the oracle.
    #[must_use]
    pub fn is_within_tolerance(&self) -> bool {
        self.max_relative_error < RELATIVE_TOLERANCE
    }
}

/// Per-run records and aggregate timing for one reducer configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkReport {
    strategy: &'static str,
    workers: NonZeroUsize,
    len: usize,
    runs: Vec<RunRecord>,
    verification: Option<Verification>,
}

impl BenchmarkReport {
    pub(crate) const fn new(
        strategy: &'static str,
        workers: NonZeroUsize,
        len: usize,
        runs: Vec<RunRecord>,
        verification: Option<Verification>,
    ) -> Self {
        Self {
            strategy,
            workers,
            len,
            runs,
            verification,
        }
    }

    /// Name of the reducer that was measured.
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        self.strategy
    }

    /// Worker or rank count of the measured reducer.
    #[must_use]
    pub const fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Length of each measured vector.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; vector lengths are validated to be non-zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records in run order.
    #[must_use]
    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    /// Sum of the elapsed time of every run.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.runs.iter().map(|record| record.elapsed).sum()
    }

    /// Mean elapsed time per run.
    #[must_use]
    pub fn average(&self) -> Duration {
        if self.runs.is_empty() {
            return Duration::ZERO;
        }
        self.total().div_f64(self.runs.len() as f64)
    }

    /// Oracle comparison, when verification was enabled.
    #[must_use]
    pub const fn verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }
}
