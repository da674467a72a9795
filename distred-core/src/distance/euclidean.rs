use crate::distance::types::{Distance, Result, SumOfSquares, Vector};

/// Folds `Σ (left[i] - right[i])²` over two slices.
///
/// This is the per-worker kernel: it has no side effects and touches only the
/// slices it is given. Lengths are not validated here; the shorter slice
/// bounds the fold.
///
/// # Examples
///
/// ```
/// use distred_core::sum_squared_differences;
///
/// assert_eq!(sum_squared_differences(&[1.0, 2.0], &[4.0, 6.0]), 25.0);
/// ```
#[must_use]
pub fn sum_squared_differences(left: &[f64], right: &[f64]) -> f64 {
    left.iter()
        .zip(right)
        .fold(0.0_f64, |sum, (&l, &r)| {
            let diff = l - r;
            sum + diff * diff
        })
}

/// Computes the Euclidean distance between two vectors in one sequential pass.
///
/// The result serves as the verification oracle for every parallel reducer.
///
/// # Examples
///
/// ```
/// use distred_core::{DistanceError, euclidean_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = euclidean_distance(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0])?;
///     assert!((distance.value() - 50.0_f64.sqrt()).abs() < 1e-12);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`crate::DistanceError::ZeroLength`] when any input is empty.
/// - [`crate::DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`crate::DistanceError::NonFinite`] when a value is NaN or infinite.
pub fn euclidean_distance(left: &[f64], right: &[f64]) -> Result<Distance> {
    let (left, right) = Vector::pair(left, right)?;

    let sum = SumOfSquares::from_raw(sum_squared_differences(&left, &right));
    Ok(sum.into_distance())
}

/// Relative error of `observed` against `expected`.
///
/// Falls back to the absolute error when `expected` is zero so identical
/// vectors still compare cleanly.
#[must_use]
pub fn relative_error(observed: f64, expected: f64) -> f64 {
    let diff = (observed - expected).abs();
    if expected == 0.0 {
        diff
    } else {
        diff / expected.abs()
    }
}

/// Tolerance under which two distances are treated as the same result.
pub const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Returns `true` when `observed` agrees with `expected` within
/// [`RELATIVE_TOLERANCE`].
#[must_use]
pub fn within_tolerance(observed: f64, expected: f64) -> bool {
    relative_error(observed, expected) < RELATIVE_TOLERANCE
}
