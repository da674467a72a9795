//! Cross-strategy tests for the partition-compute-combine reducers.

use std::num::NonZeroUsize;

use proptest::{prelude::*, test_runner::TestCaseError};
use rstest::rstest;
use test_strategy::Arbitrary;

use super::*;
use crate::{
    distance::{euclidean_distance, relative_error, within_tolerance},
    partition::partition,
    test_utils::suite_proptest_config,
};

fn workers(count: usize) -> NonZeroUsize {
    NonZeroUsize::new(count).expect("worker count must be non-zero")
}

fn reducers(count: usize) -> Vec<Box<dyn DistanceReducer>> {
    let count = workers(count);
    vec![
        Box::new(SequentialReducer),
        Box::new(
            SharedMemoryReducer::new(count, ThreadModel::ForkJoin).expect("pool must build"),
        ),
        Box::new(SharedMemoryReducer::new(count, ThreadModel::Scoped).expect("scoped reducer")),
        Box::new(DistributedReducer::new(count, DataLayout::Replicated).expect("group must start")),
        Box::new(DistributedReducer::new(count, DataLayout::Scattered).expect("group must start")),
    ]
}

fn ramp(len: usize) -> VectorPair {
    let left = (0..len).map(|i| i as f64 * 0.25).collect();
    let right = (0..len).map(|i| (len - i) as f64 * 0.5).collect();
    VectorPair::new(left, right).expect("ramp pair is valid")
}

#[rstest]
#[case::single_worker(1, 17)]
#[case::even_split(4, 1_000)]
#[case::uneven_split(3, 1_001)]
#[case::more_workers_than_elements(16, 5)]
fn every_strategy_matches_the_oracle(#[case] count: usize, #[case] len: usize) {
    let pair = ramp(len);
    let expected = euclidean_distance(pair.left(), pair.right()).expect("oracle must succeed");
    for reducer in reducers(count) {
        let observed = reducer.reduce(&pair).expect("reduction must succeed");
        assert!(
            within_tolerance(observed.value(), expected.value()),
            "{} with {count} workers drifted: {} vs {}",
            reducer.name(),
            observed.value(),
            expected.value(),
        );
    }
}

#[rstest]
#[case::positive(3.0, 7.5)]
#[case::negative(-2.0, 4.0)]
#[case::equal(1.5, 1.5)]
fn single_element_is_absolute_difference(#[case] a: f64, #[case] b: f64) {
    let pair = VectorPair::new(vec![a], vec![b]).expect("valid pair");
    for reducer in reducers(4) {
        let distance = reducer.reduce(&pair).expect("reduction must succeed");
        assert_eq!(distance.value(), (a - b).abs(), "{}", reducer.name());
    }
}

#[test]
fn identical_vectors_are_zero_apart() {
    let values: Vec<f64> = (0..257).map(|i| f64::from(i) * 0.1).collect();
    let pair = VectorPair::new(values.clone(), values).expect("valid pair");
    for reducer in reducers(8) {
        assert_eq!(reducer.reduce(&pair).expect("reduction").value(), 0.0);
    }
}

#[test]
fn single_worker_is_bit_identical_to_sequential() {
    let pair = ramp(4_099);
    let baseline = SequentialReducer.reduce(&pair).expect("sequential reduction");
    for reducer in reducers(1) {
        let observed = reducer.reduce(&pair).expect("reduction must succeed");
        assert_eq!(
            observed.value().to_bits(),
            baseline.value().to_bits(),
            "{}",
            reducer.name()
        );
    }
}

#[test]
fn workers_reports_configured_count() {
    for reducer in reducers(6).into_iter().skip(1) {
        assert_eq!(reducer.workers().get(), 6, "{}", reducer.name());
    }
    assert_eq!(SequentialReducer.workers().get(), 1);
}

#[test]
fn combine_accepts_partials_in_any_order() {
    let left = [1.0, 2.0, 3.0, 4.0, 5.0];
    let right = [0.0; 5];
    let mut partials: Vec<_> = partition(5, workers(3))
        .into_iter()
        .map(|part| PartialSum::compute(part, &left, &right))
        .collect();
    partials.reverse();
    let total = combine(partials, 3, 5).expect("combine must succeed");
    assert_eq!(total.value(), 55.0);
}

#[test]
fn combine_rejects_missing_partial() {
    let left = [1.0; 6];
    let right = [0.0; 6];
    let mut partials: Vec<_> = partition(6, workers(3))
        .into_iter()
        .map(|part| PartialSum::compute(part, &left, &right))
        .collect();
    partials.pop();
    let err = combine(partials, 3, 6).expect_err("missing partial must fail");
    assert_eq!(
        err,
        ReduceError::IncompleteCombine {
            expected: 3,
            received: 2
        }
    );
}

#[test]
fn combine_rejects_duplicated_partition() {
    let parts = partition(6, workers(2));
    let first = parts.first().copied().expect("two partitions");
    let partials = vec![
        PartialSum::from_parts(first, 1.0),
        PartialSum::from_parts(first, 1.0),
    ];
    let err = combine(partials, 2, 6).expect_err("duplicate partition must fail");
    assert_eq!(
        err,
        ReduceError::IncompleteCombine {
            expected: 2,
            received: 1
        }
    );
}

fn equal_length_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1_usize..512).prop_flat_map(|len| {
        (
            prop::collection::vec(-1.0e3_f64..1.0e3, len),
            prop::collection::vec(-1.0e3_f64..1.0e3, len),
        )
    })
}

/// Parallel reducer configuration drawn by the property suite.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
enum Topology {
    #[weight(2)]
    ForkJoin,
    #[weight(1)]
    Scoped,
    #[weight(2)]
    Replicated,
    #[weight(1)]
    Scattered,
}

impl Topology {
    fn build(self, count: NonZeroUsize) -> Result<Box<dyn DistanceReducer>> {
        Ok(match self {
            Self::ForkJoin => Box::new(SharedMemoryReducer::new(count, ThreadModel::ForkJoin)?),
            Self::Scoped => Box::new(SharedMemoryReducer::new(count, ThreadModel::Scoped)?),
            Self::Replicated => Box::new(DistributedReducer::new(count, DataLayout::Replicated)?),
            Self::Scattered => Box::new(DistributedReducer::new(count, DataLayout::Scattered)?),
        })
    }
}

fn assert_matches_oracle(
    left: Vec<f64>,
    right: Vec<f64>,
    topology: Topology,
    count: usize,
) -> core::result::Result<(), TestCaseError> {
    let fail = |err: ReduceError| TestCaseError::fail(err.to_string());
    let pair = VectorPair::new(left, right).map_err(fail)?;
    let expected = euclidean_distance(pair.left(), pair.right())
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    let reducer = topology.build(workers(count)).map_err(fail)?;
    let observed = reducer.reduce(&pair).map_err(fail)?;
    let error = relative_error(observed.value(), expected.value());
    prop_assert!(
        error < 1e-9,
        "{:?} with {} workers: relative error {}",
        topology,
        count,
        error
    );
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn parallel_strategies_agree_with_oracle(
        (left, right) in equal_length_pair(),
        topology in any::<Topology>(),
        count in 1_usize..=16,
    ) {
        assert_matches_oracle(left, right, topology, count)?;
    }
}
