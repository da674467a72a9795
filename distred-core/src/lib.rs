//! Distred core library.
//!
//! Computes the Euclidean distance between two equal-length vectors with
//! interchangeable sequential, shared-memory and message-passing reducers, and
//! times them with a repeatable benchmark harness.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
pub mod distance;
mod engine;
mod error;
mod harness;
mod partition;
mod reducer;
mod vectors;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    builder::{ExecutionStrategy, ReducerBuilder},
    distance::{
        Distance, DistanceError, RELATIVE_TOLERANCE, SumOfSquares, euclidean_distance,
        relative_error, sum_squared_differences, within_tolerance,
    },
    engine::Reducer,
    error::{DistanceErrorCode, ReduceError, ReduceErrorCode, Result},
    harness::{
        Benchmark, BenchmarkBuilder, BenchmarkReport, DEFAULT_RUNS, DEFAULT_SWEEP, RunRecord,
        Verification,
    },
    partition::{Partition, covers_exactly, partition},
    reducer::{
        DataLayout, DistanceReducer, DistributedReducer, PartialSum, ProcessGroup,
        SequentialReducer, SharedMemoryReducer, ThreadModel, combine,
    },
    vectors::{GeneratorConfig, SeedPolicy, ValueRange, VectorPair},
};
