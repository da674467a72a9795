//! Benchmark support crate for distred.
//!
//! Provides seeded inputs, reducer construction and parameter labels for the
//! Criterion benchmarks that compare execution strategies across vector
//! lengths and worker counts.

pub mod error;
pub mod inputs;
pub mod params;
