use std::sync::Arc;

use distred_core::{
    DistanceError, DistanceErrorCode, ReduceError, ReduceErrorCode, distance::VectorKind,
};
use rstest::rstest;

#[rstest]
#[case(DistanceError::ZeroLength, DistanceErrorCode::ZeroLength)]
#[case(
    DistanceError::DimensionMismatch { left: 1, right: 2 },
    DistanceErrorCode::DimensionMismatch,
)]
#[case(
    DistanceError::NonFinite { which: VectorKind::Left, index: 0, value: f64::INFINITY },
    DistanceErrorCode::NonFinite,
)]
fn returns_expected_distance_code(
    #[case] error: DistanceError,
    #[case] expected: DistanceErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert!(expected.as_str().starts_with("DISTANCE_"));
}

#[rstest]
#[case(
    ReduceError::InvalidVectorLength { got: 0 },
    ReduceErrorCode::InvalidVectorLength,
    "DISTRED_INVALID_VECTOR_LENGTH",
    true,
)]
#[case(
    ReduceError::InvalidRunCount { got: 0 },
    ReduceErrorCode::InvalidRunCount,
    "DISTRED_INVALID_RUN_COUNT",
    true,
)]
#[case(
    ReduceError::InvalidWorkerCount { got: 0 },
    ReduceErrorCode::InvalidWorkerCount,
    "DISTRED_INVALID_WORKER_COUNT",
    true,
)]
#[case(ReduceError::EmptySweep, ReduceErrorCode::EmptySweep, "DISTRED_EMPTY_SWEEP", true)]
#[case(
    ReduceError::AllocationFailed { requested: 8 },
    ReduceErrorCode::AllocationFailed,
    "DISTRED_ALLOCATION_FAILED",
    false,
)]
#[case(
    ReduceError::WorkerSpawn { reason: Arc::from("no threads") },
    ReduceErrorCode::WorkerSpawn,
    "DISTRED_WORKER_SPAWN",
    false,
)]
#[case(
    ReduceError::WorkerLost { rank: 3 },
    ReduceErrorCode::WorkerLost,
    "DISTRED_WORKER_LOST",
    false,
)]
#[case(
    ReduceError::IncompleteCombine { expected: 4, received: 3 },
    ReduceErrorCode::IncompleteCombine,
    "DISTRED_INCOMPLETE_COMBINE",
    false,
)]
#[case(
    ReduceError::GroupPoisoned,
    ReduceErrorCode::GroupPoisoned,
    "DISTRED_GROUP_POISONED",
    false,
)]
fn returns_expected_reduce_code(
    #[case] error: ReduceError,
    #[case] expected: ReduceErrorCode,
    #[case] text: &str,
    #[case] configuration: bool,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), text);
    assert_eq!(error.code().to_string(), text);
    assert_eq!(error.is_configuration(), configuration);
    assert_eq!(error.distance_code(), None);
}

#[test]
fn wrapped_distance_error_exposes_both_codes() {
    let error = ReduceError::from(DistanceError::DimensionMismatch { left: 2, right: 3 });
    assert_eq!(error.code(), ReduceErrorCode::InvalidInput);
    assert_eq!(
        error.distance_code(),
        Some(DistanceErrorCode::DimensionMismatch)
    );
    let source = std::error::Error::source(&error).expect("kernel error is the source");
    assert_eq!(source.to_string(), "dimension mismatch: left=2, right=3");
}
