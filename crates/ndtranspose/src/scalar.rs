//! Scalar trait for tensor element types.

use faer_traits::ComplexField;
use std::fmt::Debug;

pub use faer::{c32, c64};

/// Trait for scalar types supported by ndtranspose.
///
/// This wraps faer's `ComplexField` with the bounds needed to move elements
/// between tensors. Permutation never inspects values, so any field type works.
pub trait Scalar: ComplexField + Copy + Debug + Default + Send + Sync + 'static {
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;
}

impl Scalar for f32 {
    fn one() -> Self {
        1.0
    }
}

impl Scalar for f64 {
    fn one() -> Self {
        1.0
    }
}

impl Scalar for c32 {
    fn one() -> Self {
        c32::new(1.0, 0.0)
    }
}

impl Scalar for c64 {
    fn one() -> Self {
        c64::new(1.0, 0.0)
    }
}
