//! Failures raised while preparing benchmark inputs and reducers.

use distred_core::ReduceError;

/// Setup failure for a benchmark group.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Input generation or reducer construction failed.
    #[error("reducer setup failed: {0}")]
    Reduce(#[from] ReduceError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// Parameter that was zero.
        context: &'static str,
    },
}
