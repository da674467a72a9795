//! Domain primitives shared by the distance routines.

use core::{fmt, ops::Deref};

use thiserror::Error;

/// Identifies whether an error was produced while inspecting the left or right
/// vector argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorKind {
    /// Value originating from the first argument.
    Left,
    /// Value originating from the second argument.
    Right,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Errors emitted while validating distance inputs.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceError {
    /// Either input vector had zero length.
    #[error("vectors must have positive dimension")]
    ZeroLength,
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Length of the left-hand vector.
        left: usize,
        /// Length of the right-hand vector.
        right: usize,
    },
    /// Encountered a non-finite value in one of the vectors.
    #[error("{which} vector contains a non-finite value at index {index}: {value}")]
    NonFinite {
        /// Vector holding the offending value.
        which: VectorKind,
        /// Position of the offending value.
        index: usize,
        /// The rejected value.
        value: f64,
    },
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;

/// Vector newtype that validates dimensionality and finiteness on construction.
#[derive(Clone, Copy, Debug)]
pub struct Vector<'a>(&'a [f64]);

impl<'a> Vector<'a> {
    /// Validates and constructs a [`Vector`].
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::ZeroLength`] when the slice is empty and
    /// [`DistanceError::NonFinite`] when a value is NaN or infinite.
    pub fn new(values: &'a [f64], which: VectorKind) -> Result<Self> {
        if values.is_empty() {
            return Err(DistanceError::ZeroLength);
        }

        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(DistanceError::NonFinite {
                which,
                index,
                value: *value,
            });
        }

        Ok(Self(values))
    }

    /// Returns the dimensionality of the vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Validates both sides of a reduction input.
    ///
    /// # Errors
    ///
    /// Propagates [`Vector::new`] failures, left side first, then returns
    /// [`DistanceError::DimensionMismatch`] when the lengths differ.
    pub fn pair(left: &'a [f64], right: &'a [f64]) -> Result<(Self, Self)> {
        let left = Self::new(left, VectorKind::Left)?;
        let right = Self::new(right, VectorKind::Right)?;
        match (left.dimension(), right.dimension()) {
            (l, r) if l == r => Ok((left, right)),
            (l, r) => Err(DistanceError::DimensionMismatch { left: l, right: r }),
        }
    }
}

impl AsRef<[f64]> for Vector<'_> {
    fn as_ref(&self) -> &[f64] {
        self.0
    }
}

impl Deref for Vector<'_> {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

/// Combined sum of squared differences across every partition.
///
/// Only the combine step constructs this value, so holding one means every
/// partial has been merged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SumOfSquares(f64);

impl SumOfSquares {
    pub(crate) fn from_raw(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw combined sum.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Takes the single square root that finishes a reduction.
    #[must_use]
    pub fn into_distance(self) -> Distance {
        Distance(self.0.sqrt())
    }
}

/// Euclidean distance newtype.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    #[cfg(test)]
    pub(crate) fn from_raw(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw distance value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Deref for Distance {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
