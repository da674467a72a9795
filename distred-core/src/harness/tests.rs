//! Tests for the benchmark harness.

use std::sync::Mutex;

use rstest::rstest;

use super::*;
use crate::{
    builder::ExecutionStrategy,
    reducer::{SequentialReducer, ThreadModel},
};

/// Records every pair handed to it so tests can observe regeneration.
#[derive(Default)]
struct RecordingReducer {
    seen: Mutex<Vec<VectorPair>>,
}

impl DistanceReducer for RecordingReducer {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn workers(&self) -> NonZeroUsize {
        NonZeroUsize::MIN
    }

    fn reduce(&self, pair: &VectorPair) -> Result<Distance> {
        self.seen.lock().expect("lock poisoned").push(pair.clone());
        SequentialReducer.reduce(pair)
    }
}

#[rstest]
#[case::zero_length(BenchmarkBuilder::new(0), ReduceError::InvalidVectorLength { got: 0 })]
#[case::zero_runs(BenchmarkBuilder::new(8).with_runs(0), ReduceError::InvalidRunCount { got: 0 })]
fn build_rejects_invalid_configuration(
    #[case] builder: BenchmarkBuilder,
    #[case] expected: ReduceError,
) {
    let err = builder.build().expect_err("configuration must be rejected");
    assert_eq!(err, expected);
    assert!(err.is_configuration());
}

#[test]
fn defaults_to_ten_verified_runs() {
    let benchmark = BenchmarkBuilder::new(4).build().expect("valid configuration");
    assert_eq!(benchmark.runs().get(), DEFAULT_RUNS);
    assert!(benchmark.verifies());
    assert_eq!(benchmark.generator().seed, SeedPolicy::Entropy);
}

#[test]
fn run_records_every_run_in_order() {
    let benchmark = BenchmarkBuilder::new(128)
        .with_seed(SeedPolicy::Fixed(42))
        .build()
        .expect("valid configuration");
    let report = benchmark.run(&SequentialReducer).expect("benchmark must run");

    let indices: Vec<_> = report.runs().iter().map(|record| record.run).collect();
    assert_eq!(indices, (1..=DEFAULT_RUNS).collect::<Vec<_>>());
    assert_eq!(report.strategy(), "sequential");
    assert_eq!(report.len(), 128);
    let first = report.runs().first().expect("at least one run").distance;
    assert!(report.runs().iter().all(|record| record.distance == first));
    let verification = report.verification().expect("verification enabled");
    assert_eq!(verification.oracle(), first);
    assert_eq!(verification.max_relative_error(), 0.0);
}

#[test]
fn verification_can_be_disabled() {
    let benchmark = BenchmarkBuilder::new(16)
        .with_runs(2)
        .verify(false)
        .build()
        .expect("valid configuration");
    let report = benchmark.run(&SequentialReducer).expect("benchmark must run");
    assert!(report.verification().is_none());
}

#[rstest]
#[case::reused(false, 1)]
#[case::regenerated(true, 3)]
fn regeneration_controls_distinct_inputs(#[case] regenerate: bool, #[case] distinct: usize) {
    let benchmark = BenchmarkBuilder::new(32)
        .with_runs(3)
        .with_seed(SeedPolicy::Fixed(9))
        .with_values(ValueRange::Percent)
        .regenerate_each_run(regenerate)
        .build()
        .expect("valid configuration");
    let reducer = RecordingReducer::default();
    benchmark.run(&reducer).expect("benchmark must run");

    let mut seen = reducer.seen.lock().expect("lock poisoned").clone();
    seen.dedup();
    assert_eq!(seen.len(), distinct);
}

#[test]
fn sweep_reports_each_worker_count() {
    let benchmark = BenchmarkBuilder::new(257)
        .with_runs(2)
        .with_seed(SeedPolicy::Fixed(3))
        .build()
        .expect("valid configuration");
    let builder = ReducerBuilder::new()
        .with_strategy(ExecutionStrategy::SharedMemory)
        .with_thread_model(ThreadModel::Scoped);
    let reports = benchmark
        .sweep(&builder, &DEFAULT_SWEEP)
        .expect("sweep must run");

    let counts: Vec<_> = reports.iter().map(|report| report.workers().get()).collect();
    assert_eq!(counts, DEFAULT_SWEEP.to_vec());
    for report in &reports {
        let verification = report.verification().expect("verification enabled");
        assert!(verification.is_within_tolerance());
    }
    let oracles: Vec<_> = reports
        .iter()
        .filter_map(|report| report.verification().map(Verification::oracle))
        .collect();
    assert!(oracles.windows(2).all(|pair| pair.first() == pair.last()));
}

#[rstest]
#[case::empty(vec![], ReduceError::EmptySweep)]
#[case::zero_count(vec![2, 0, 4], ReduceError::InvalidWorkerCount { got: 0 })]
fn sweep_validates_before_running(#[case] counts: Vec<usize>, #[case] expected: ReduceError) {
    let benchmark = BenchmarkBuilder::new(8).build().expect("valid configuration");
    let err = benchmark
        .sweep(&ReducerBuilder::new(), &counts)
        .expect_err("sweep must be rejected");
    assert_eq!(err, expected);
}

#[test]
fn run_emits_an_event_per_run() {
    use distred_test_support::tracing::RecordingLayer;
    use tracing_subscriber::{Registry, layer::SubscriberExt};

    let layer = RecordingLayer::default();
    let subscriber = Registry::default().with(layer.clone());
    let benchmark = BenchmarkBuilder::new(16)
        .with_runs(4)
        .build()
        .expect("valid configuration");
    tracing::subscriber::with_default(subscriber, || {
        benchmark.run(&SequentialReducer).expect("benchmark must run");
    });

    let runs: Vec<_> = layer
        .events()
        .into_iter()
        .filter_map(|event| event.fields.get("run").cloned())
        .collect();
    assert_eq!(runs, ["1", "2", "3", "4"]);
    assert!(
        layer
            .spans()
            .iter()
            .any(|span| span.name == "core.benchmark"
                && span.fields.get("strategy").map(String::as_str) == Some("sequential"))
    );
}
