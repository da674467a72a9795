//! End-to-end tests driving reducers through the public builder surface.

use distred_core::{
    BenchmarkBuilder, DataLayout, DistanceReducer, ExecutionStrategy, ReduceError,
    ReducerBuilder, SeedPolicy, ThreadModel, ValueRange, VectorPair, distance::within_tolerance,
};
use distred_test_support::{fixtures::ramp_pair, tracing::capture};
use rstest::rstest;

fn builder(strategy: ExecutionStrategy, workers: usize) -> ReducerBuilder {
    ReducerBuilder::new()
        .with_strategy(strategy)
        .with_workers(workers)
}

#[rstest]
#[case::sequential(builder(ExecutionStrategy::Sequential, 1))]
#[case::fork_join(builder(ExecutionStrategy::SharedMemory, 4))]
#[case::scoped(builder(ExecutionStrategy::SharedMemory, 4).with_thread_model(ThreadModel::Scoped))]
#[case::replicated(builder(ExecutionStrategy::Distributed, 4))]
#[case::scattered(builder(ExecutionStrategy::Distributed, 4).with_layout(DataLayout::Scattered))]
fn configured_reducers_agree_with_sequential(#[case] builder: ReducerBuilder) {
    let (left, right) = ramp_pair(10_007);
    let pair = VectorPair::new(left, right).expect("fixture pair is valid");
    let reducer = builder.build().expect("configuration is valid");
    let baseline = ReducerBuilder::new()
        .build()
        .expect("sequential builds")
        .reduce(&pair)
        .expect("sequential reduction");

    let distance = reducer.reduce(&pair).expect("reduction must succeed");
    assert!(within_tolerance(distance.value(), baseline.value()));
}

#[test]
fn reducer_is_reusable_for_many_pairs() {
    let reducer = builder(ExecutionStrategy::Distributed, 3)
        .build()
        .expect("configuration is valid");
    for len in [1, 2, 3, 4, 97] {
        let (left, right) = ramp_pair(len);
        let pair = VectorPair::new(left.clone(), right.clone()).expect("valid pair");
        let expected = distred_core::distance::euclidean_distance(&left, &right)
            .expect("oracle must succeed");
        let observed = reducer.reduce(&pair).expect("reduction must succeed");
        assert!(within_tolerance(observed.value(), expected.value()));
    }
}

#[test]
fn invalid_worker_count_is_rejected_before_spawning() {
    let (result, layer) = capture(|| builder(ExecutionStrategy::Distributed, 0).build());
    let err = result.expect_err("zero ranks must be rejected");
    assert_eq!(err, ReduceError::InvalidWorkerCount { got: 0 });
    assert!(layer.span_named("core.spawn_group").is_none());
}

#[test]
fn reductions_are_instrumented_with_strategy() {
    let reducer = builder(ExecutionStrategy::SharedMemory, 2)
        .build()
        .expect("configuration is valid");
    let pair = VectorPair::new(vec![0.0, 0.0], vec![3.0, 4.0]).expect("valid pair");
    let (distance, layer) = capture(|| reducer.reduce(&pair));
    assert_eq!(distance.expect("reduction must succeed").value(), 5.0);

    let span = layer.span_named("core.reduce").expect("dispatch span recorded");
    assert_eq!(span.field("strategy"), Some("shared-memory"));
    assert_eq!(span.field("workers"), Some("2"));
    assert!(layer.span_named("core.reduce_shared").is_some());
}

#[test]
fn benchmark_runs_distributed_reducer_end_to_end() {
    let benchmark = BenchmarkBuilder::new(4_096)
        .with_runs(3)
        .with_seed(SeedPolicy::Fixed(42))
        .with_values(ValueRange::Percent)
        .build()
        .expect("valid configuration");
    let reducer = builder(ExecutionStrategy::Distributed, 4)
        .with_layout(DataLayout::Scattered)
        .build()
        .expect("configuration is valid");

    let report = benchmark.run(&reducer).expect("benchmark must run");
    assert_eq!(report.strategy(), "distributed");
    assert_eq!(report.workers().get(), 4);
    assert_eq!(report.runs().len(), 3);
    assert!(
        report
            .verification()
            .is_some_and(|verification| verification.is_within_tolerance())
    );
}
