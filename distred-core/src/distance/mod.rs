//! Distance primitives for the reduction kernel.
//!
//! Exposes the side-effect-free squared-difference fold every worker runs over
//! its partition, the validated single-pass Euclidean distance used as the
//! verification oracle, and the tolerance helpers that compare the two.

mod euclidean;
mod types;

pub use self::euclidean::{
    RELATIVE_TOLERANCE, euclidean_distance, relative_error, sum_squared_differences,
    within_tolerance,
};
pub use self::types::{Distance, DistanceError, Result, SumOfSquares, Vector, VectorKind};

// ============================================================================
// Kani Formal Verification
// ============================================================================

#[cfg(kani)]
mod kani_proofs {
    use super::{euclidean_distance, sum_squared_differences};

    /// Tolerance for floating-point comparisons in distance functions.
    const EPSILON: f64 = 1e-9;

    /// Verifies Euclidean distance symmetry: d(a, b) = d(b, a).
    #[kani::proof]
    #[kani::unwind(4)]
    fn verify_euclidean_symmetry_3d() {
        let a: [f64; 3] = [kani::any(), kani::any(), kani::any()];
        let b: [f64; 3] = [kani::any(), kani::any(), kani::any()];

        for &v in a.iter().chain(b.iter()) {
            kani::assume(v.is_finite() && v.abs() < 1e6);
        }

        if let (Ok(d1), Ok(d2)) = (euclidean_distance(&a, &b), euclidean_distance(&b, &a)) {
            kani::assert(
                (d1.value() - d2.value()).abs() < EPSILON,
                "euclidean distance symmetry violated",
            );
        }
    }

    /// Verifies the kernel is zero on identical inputs.
    #[kani::proof]
    #[kani::unwind(4)]
    fn verify_kernel_zero_on_identical_3d() {
        let v: [f64; 3] = [kani::any(), kani::any(), kani::any()];

        for &x in &v {
            kani::assume(x.is_finite());
        }

        kani::assert(
            sum_squared_differences(&v, &v) == 0.0,
            "kernel not zero on identical inputs",
        );
    }
}
