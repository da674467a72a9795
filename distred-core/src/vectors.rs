//! Immutable vector pairs and their random generation.
//!
//! A [`VectorPair`] is validated once at construction and then shared
//! read-only between workers. Storage is reserved fallibly so an oversized
//! request surfaces as [`ReduceError::AllocationFailed`] instead of aborting
//! the process.

use std::{num::NonZeroUsize, sync::Arc};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, instrument};

use crate::{
    Result,
    distance::Vector,
    error::ReduceError,
};

/// Seeding policy for random vector generation.
///
/// # Examples
/// ```
/// use distred_core::SeedPolicy;
///
/// assert_eq!(SeedPolicy::default(), SeedPolicy::Entropy);
/// assert!(SeedPolicy::Fixed(42).is_reproducible());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SeedPolicy {
    /// Draw a fresh seed from the operating system for every generator.
    #[default]
    Entropy,
    /// Use a fixed seed so every generator yields the same vectors.
    Fixed(u64),
}

impl SeedPolicy {
    /// Returns `true` when generation is repeatable across processes.
    #[must_use]
    pub const fn is_reproducible(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Derives the policy for the `run`-th regeneration.
    ///
    /// Fixed seeds are offset by the run index so regenerated vectors differ
    /// between runs yet stay reproducible; entropy is left unchanged.
    ///
    /// # Examples
    /// ```
    /// use distred_core::SeedPolicy;
    ///
    /// assert_eq!(SeedPolicy::Fixed(42).for_run(3), SeedPolicy::Fixed(45));
    /// assert_eq!(SeedPolicy::Entropy.for_run(3), SeedPolicy::Entropy);
    /// ```
    #[must_use]
    pub const fn for_run(self, run: u64) -> Self {
        match self {
            Self::Entropy => Self::Entropy,
            Self::Fixed(seed) => Self::Fixed(seed.wrapping_add(run)),
        }
    }

    fn rng(self) -> SmallRng {
        match self {
            Self::Entropy => SmallRng::from_entropy(),
            Self::Fixed(seed) => SmallRng::seed_from_u64(seed),
        }
    }
}

/// Range that generated values are drawn from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValueRange {
    /// Uniform values in `[0, 1)`.
    #[default]
    UnitInterval,
    /// Whole numbers in `0..=99`, stored as `f64`.
    Percent,
}

impl ValueRange {
    fn sample(self, rng: &mut SmallRng) -> f64 {
        match self {
            Self::UnitInterval => rng.gen_range(0.0..1.0),
            Self::Percent => f64::from(rng.gen_range(0_u8..100)),
        }
    }
}

/// Parameters for [`VectorPair::generate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of elements in each vector.
    pub len: NonZeroUsize,
    /// Seeding policy for the random generator.
    pub seed: SeedPolicy,
    /// Range generated values are drawn from.
    pub values: ValueRange,
}

impl GeneratorConfig {
    /// Creates a configuration with entropy seeding and unit-interval values.
    #[must_use]
    pub const fn new(len: NonZeroUsize) -> Self {
        Self {
            len,
            seed: SeedPolicy::Entropy,
            values: ValueRange::UnitInterval,
        }
    }

    /// Overrides the seeding policy.
    #[must_use]
    pub const fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the value range.
    #[must_use]
    pub const fn with_values(mut self, values: ValueRange) -> Self {
        self.values = values;
        self
    }
}

/// Two validated vectors of identical, non-zero length.
///
/// Cloning is cheap: both sides are reference counted and never mutated.
/// The buffers handed to [`VectorPair::new`] or reserved by
/// [`VectorPair::generate`] are kept as-is, never copied.
///
/// # Examples
/// ```
/// use distred_core::VectorPair;
///
/// let pair = VectorPair::new(vec![1.0, 2.0], vec![4.0, 6.0]).expect("valid pair");
/// assert_eq!(pair.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct VectorPair {
    left: Arc<Vec<f64>>,
    right: Arc<Vec<f64>>,
}

impl VectorPair {
    /// Validates and wraps two vectors.
    ///
    /// # Errors
    /// Returns [`ReduceError::Distance`] when either vector is empty, the
    /// lengths differ, or a value is NaN or infinite.
    pub fn new(left: Vec<f64>, right: Vec<f64>) -> Result<Self> {
        Vector::pair(&left, &right)?;
        Ok(Self {
            left: Arc::new(left),
            right: Arc::new(right),
        })
    }

    /// Generates a random pair as described by `config`.
    ///
    /// Values are drawn alternately for the left and right vector from a
    /// single generator, so a fixed seed reproduces both sides.
    ///
    /// # Errors
    /// Returns [`ReduceError::AllocationFailed`] when storage for either
    /// vector cannot be reserved.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use distred_core::{GeneratorConfig, SeedPolicy, VectorPair};
    ///
    /// let len = NonZeroUsize::new(16).expect("non-zero");
    /// let config = GeneratorConfig::new(len).with_seed(SeedPolicy::Fixed(42));
    /// let first = VectorPair::generate(&config)?;
    /// let second = VectorPair::generate(&config)?;
    /// assert_eq!(first, second);
    /// # Ok::<(), distred_core::ReduceError>(())
    /// ```
    #[instrument(
        name = "core.generate",
        err,
        skip(config),
        fields(len = config.len.get(), seed = ?config.seed, values = ?config.values),
    )]
    pub fn generate(config: &GeneratorConfig) -> Result<Self> {
        let len = config.len.get();
        let mut left = reserve(len)?;
        let mut right = reserve(len)?;
        let mut rng = config.seed.rng();

        for _ in 0..len {
            left.push(config.values.sample(&mut rng));
            right.push(config.values.sample(&mut rng));
        }

        debug!(len, "generated vector pair");
        Ok(Self {
            left: Arc::new(left),
            right: Arc::new(right),
        })
    }

    /// Number of elements in each vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Always `false`; construction rejects empty vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Borrows the left vector.
    #[must_use]
    pub fn left(&self) -> &[f64] {
        &self.left
    }

    /// Borrows the right vector.
    #[must_use]
    pub fn right(&self) -> &[f64] {
        &self.right
    }

    /// Returns up to `count` leading values of each vector.
    #[must_use]
    pub fn preview(&self, count: usize) -> (&[f64], &[f64]) {
        let take = count.min(self.len());
        (
            self.left.get(..take).unwrap_or_default(),
            self.right.get(..take).unwrap_or_default(),
        )
    }

    pub(crate) fn shared_left(&self) -> Arc<Vec<f64>> {
        Arc::clone(&self.left)
    }

    pub(crate) fn shared_right(&self) -> Arc<Vec<f64>> {
        Arc::clone(&self.right)
    }
}

fn reserve(len: usize) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| ReduceError::AllocationFailed { requested: len })?;
    Ok(values)
}
