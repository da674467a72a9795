//! Benchmark parameter types.

use std::fmt;

use distred_core::ExecutionStrategy;

/// Parameters for one reducer benchmark case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReduceBenchParams {
    /// Strategy under measurement.
    pub strategy: ExecutionStrategy,
    /// Number of elements in each vector.
    pub len: usize,
    /// Worker threads or ranks.
    pub workers: usize,
}

impl fmt::Display for ReduceBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},n={},w={}",
            self.strategy.as_str(),
            self.len,
            self.workers
        )
    }
}
