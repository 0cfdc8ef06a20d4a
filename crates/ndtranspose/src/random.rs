//! Random tensor and permutation construction.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::TensorError;
use crate::permutation::AxisPermutation;
use crate::scalar::{Scalar, c32, c64};
use crate::tensor::Tensor;

/// Types that can be sampled uniformly from [-1, 1).
///
/// Complex types sample real and imaginary parts independently.
pub trait RandomUniform: Scalar {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self;
}

impl RandomUniform for f32 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        rng.random_range(-1.0..1.0)
    }
}

impl RandomUniform for f64 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        rng.random_range(-1.0..1.0)
    }
}

impl RandomUniform for c32 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        c32::new(f32::sample_uniform(rng), f32::sample_uniform(rng))
    }
}

impl RandomUniform for c64 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        c64::new(f64::sample_uniform(rng), f64::sample_uniform(rng))
    }
}

impl<ElT: RandomUniform> Tensor<ElT> {
    /// Create a tensor with uniform random values in [-1, 1).
    ///
    /// # Example
    ///
    /// ```
    /// use ndtranspose::Tensor;
    ///
    /// let t: Tensor<f32> = Tensor::random(&[2, 3]);
    /// assert_eq!(t.shape(), &[2, 3]);
    /// assert!(t.data().iter().all(|&v| (-1.0..1.0).contains(&v)));
    /// ```
    pub fn random(shape: &[usize]) -> Self {
        Self::random_with_rng(shape, &mut rand::rng())
    }

    /// Create a tensor with uniform random values using a specific RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtranspose::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let t1: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(42));
    /// let t2: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(42));
    /// assert_eq!(t1.data(), t2.data());
    /// ```
    pub fn random_with_rng<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        let mut t = Self::zeros(shape);
        for x in t.data_mut() {
            *x = ElT::sample_uniform(rng);
        }
        t
    }
}

/// A uniformly random explicit permutation of `0..ndim`.
///
/// Built through [`AxisPermutation::explicit`], so the result carries a
/// validated inverse like any other explicit permutation.
pub fn random_permutation<R: Rng>(
    ndim: usize,
    rng: &mut R,
) -> Result<AxisPermutation, TensorError> {
    let mut axes: Vec<usize> = (0..ndim).collect();
    axes.shuffle(rng);
    AxisPermutation::explicit(axes)
}
