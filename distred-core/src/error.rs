//! Error types for the distred core library.
//!
//! Defines the orchestration error surfaced by reducers, the process group and
//! the benchmark harness, together with stable machine-readable codes for both
//! orchestration and kernel failures.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::distance::DistanceError;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

define_error_codes! {
    /// Stable codes describing [`DistanceError`] variants.
    enum DistanceErrorCode for DistanceError {
        /// Either input vector had zero length.
        ZeroLength => ZeroLength => "DISTANCE_ZERO_LENGTH",
        /// Input vectors had different lengths.
        DimensionMismatch => DimensionMismatch { .. } => "DISTANCE_DIMENSION_MISMATCH",
        /// A vector contained NaN or an infinity.
        NonFinite => NonFinite { .. } => "DISTANCE_NON_FINITE",
    }
}

/// Error type produced when configuring or running a reduction.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReduceError {
    /// Vector length must be at least one.
    #[error("vector length must be at least 1 (got {got})")]
    InvalidVectorLength {
        /// The rejected vector length.
        got: usize,
    },
    /// Benchmarks must execute at least one run.
    #[error("run count must be at least 1 (got {got})")]
    InvalidRunCount {
        /// The rejected run count.
        got: usize,
    },
    /// Reductions require at least one worker.
    #[error("worker count must be at least 1 (got {got})")]
    InvalidWorkerCount {
        /// The rejected worker count.
        got: usize,
    },
    /// A worker-count sweep was requested without any worker counts.
    #[error("worker sweep requires at least one worker count")]
    EmptySweep,
    /// The input vectors failed validation.
    #[error("invalid input vectors: {error}")]
    Distance {
        /// Underlying validation failure.
        #[source]
        error: DistanceError,
    },
    /// Vector storage could not be reserved.
    #[error("failed to allocate storage for {requested} elements")]
    AllocationFailed {
        /// Number of `f64` elements that could not be reserved.
        requested: usize,
    },
    /// Worker threads or ranks could not be started.
    #[error("failed to start workers: {reason}")]
    WorkerSpawn {
        /// Message reported by the thread or pool builder.
        reason: Arc<str>,
    },
    /// A worker exited before contributing its partial sum.
    #[error("worker {rank} exited before contributing its partial sum")]
    WorkerLost {
        /// Index or rank of the worker that disappeared.
        rank: usize,
    },
    /// The combine step did not observe exactly one partial per worker.
    #[error("combine expected {expected} partial sums but received {received}")]
    IncompleteCombine {
        /// Number of partials the combine required.
        expected: usize,
        /// Number of usable partials that were observed.
        received: usize,
    },
    /// A previous reduction panicked while holding the process group.
    #[error("process group is unusable after a failed reduction")]
    GroupPoisoned,
}

impl From<DistanceError> for ReduceError {
    fn from(error: DistanceError) -> Self {
        Self::Distance { error }
    }
}

define_error_codes! {
    /// Stable codes describing [`ReduceError`] variants.
    enum ReduceErrorCode for ReduceError {
        /// Vector length must be at least one.
        InvalidVectorLength => InvalidVectorLength { .. } => "DISTRED_INVALID_VECTOR_LENGTH",
        /// Benchmarks must execute at least one run.
        InvalidRunCount => InvalidRunCount { .. } => "DISTRED_INVALID_RUN_COUNT",
        /// Reductions require at least one worker.
        InvalidWorkerCount => InvalidWorkerCount { .. } => "DISTRED_INVALID_WORKER_COUNT",
        /// A worker-count sweep was requested without any worker counts.
        EmptySweep => EmptySweep => "DISTRED_EMPTY_SWEEP",
        /// The input vectors failed validation.
        InvalidInput => Distance { .. } => "DISTRED_INVALID_INPUT",
        /// Vector storage could not be reserved.
        AllocationFailed => AllocationFailed { .. } => "DISTRED_ALLOCATION_FAILED",
        /// Worker threads or ranks could not be started.
        WorkerSpawn => WorkerSpawn { .. } => "DISTRED_WORKER_SPAWN",
        /// A worker exited before contributing its partial sum.
        WorkerLost => WorkerLost { .. } => "DISTRED_WORKER_LOST",
        /// The combine step did not observe exactly one partial per worker.
        IncompleteCombine => IncompleteCombine { .. } => "DISTRED_INCOMPLETE_COMBINE",
        /// A previous reduction panicked while holding the process group.
        GroupPoisoned => GroupPoisoned => "DISTRED_GROUP_POISONED",
    }
}

impl ReduceError {
    /// Retrieve the inner [`DistanceErrorCode`] when the error originated in
    /// input validation.
    #[must_use]
    pub const fn distance_code(&self) -> Option<DistanceErrorCode> {
        match self {
            Self::Distance { error } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` for configuration errors that are detected before any
    /// vector is generated or any worker is started.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidVectorLength { .. }
                | Self::InvalidRunCount { .. }
                | Self::InvalidWorkerCount { .. }
                | Self::EmptySweep
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ReduceError>;
