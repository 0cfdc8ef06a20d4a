//! Axis permutations and their inverses.
//!
//! An [`AxisPermutation`] is either an explicit reordering of `0..ndim` or the
//! rank-independent "reverse all axes" permutation. The explicit form is only
//! built through validation and caches its inverse, so repeated backward
//! passes never recompute it.

use crate::error::TensorError;
use std::borrow::Cow;

/// A permutation of tensor axes.
///
/// For explicit axes, output axis `k` is input axis `axes[k]`. The
/// representation is private: every explicit value has passed
/// [`validate_permutation`] and carries `inverse[axes[i]] == i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AxisPermutation(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    /// `ndim-1, ..., 1, 0`. Self-inverse.
    ReverseAll,
    Explicit { axes: Vec<usize>, inverse: Vec<usize> },
}

impl AxisPermutation {
    /// Build a permutation from optional axes.
    ///
    /// `None` gives [`AxisPermutation::reverse_all`].
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidPermutation` if `axes` contains duplicates
    /// or values outside `0..axes.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndtranspose::AxisPermutation;
    ///
    /// let p = AxisPermutation::new(Some(vec![2, 0, 1])).unwrap();
    /// assert_eq!(p.inverse_axes(), Some(&[1, 2, 0][..]));
    ///
    /// assert!(AxisPermutation::new(Some(vec![0, 0, 1])).is_err());
    /// assert_eq!(AxisPermutation::new(None).unwrap(), AxisPermutation::reverse_all());
    /// ```
    pub fn new(axes: Option<Vec<usize>>) -> Result<Self, TensorError> {
        match axes {
            Some(axes) => Self::explicit(axes),
            None => Ok(Self::reverse_all()),
        }
    }

    /// Build an explicit permutation, validating it and caching the inverse.
    pub fn explicit(axes: Vec<usize>) -> Result<Self, TensorError> {
        validate_permutation(&axes, axes.len())?;
        let inverse = inverse_axes(&axes);
        Ok(Self(Repr::Explicit { axes, inverse }))
    }

    /// The reverse-all permutation.
    pub fn reverse_all() -> Self {
        Self(Repr::ReverseAll)
    }

    /// The explicit axes, or `None` for reverse-all.
    pub fn axes(&self) -> Option<&[usize]> {
        match &self.0 {
            Repr::Explicit { axes, .. } => Some(axes),
            Repr::ReverseAll => None,
        }
    }

    /// The cached inverse axes, or `None` for reverse-all.
    pub fn inverse_axes(&self) -> Option<&[usize]> {
        match &self.0 {
            Repr::Explicit { inverse, .. } => Some(inverse),
            Repr::ReverseAll => None,
        }
    }

    /// The inverse permutation.
    ///
    /// Reverse-all is its own inverse. For explicit permutations the cached
    /// inverse becomes the new axes and the old axes become its inverse.
    pub fn inverse(&self) -> Self {
        match &self.0 {
            Repr::Explicit { axes, inverse } => Self(Repr::Explicit {
                axes: inverse.clone(),
                inverse: axes.clone(),
            }),
            Repr::ReverseAll => Self(Repr::ReverseAll),
        }
    }

    /// Concrete axis order for a tensor of rank `ndim`.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidPermutation` if an explicit permutation has
    /// a different length than `ndim`.
    pub fn resolve(&self, ndim: usize) -> Result<Cow<'_, [usize]>, TensorError> {
        match &self.0 {
            Repr::Explicit { axes, .. } => {
                if axes.len() != ndim {
                    return Err(TensorError::InvalidPermutation {
                        perm: axes.clone(),
                        ndim,
                    });
                }
                Ok(Cow::Borrowed(axes))
            }
            Repr::ReverseAll => Ok(Cow::Owned(reversed_axes(ndim))),
        }
    }

    /// Shape of a tensor with shape `shape` after this permutation.
    ///
    /// `out[k] == shape[axes[k]]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndtranspose::AxisPermutation;
    ///
    /// let p = AxisPermutation::explicit(vec![2, 0, 1]).unwrap();
    /// assert_eq!(p.permuted_shape(&[2, 3, 4]).unwrap(), vec![4, 2, 3]);
    /// assert_eq!(AxisPermutation::reverse_all().permuted_shape(&[2, 3]).unwrap(), vec![3, 2]);
    /// ```
    pub fn permuted_shape(&self, shape: &[usize]) -> Result<Vec<usize>, TensorError> {
        let axes = self.resolve(shape.len())?;
        Ok(axes.iter().map(|&a| shape[a]).collect())
    }
}

/// Compute the inverse of a permutation in a single pass.
///
/// The result satisfies `inv[axes[i]] == i`. `axes` must already be a valid
/// permutation of `0..axes.len()`.
///
/// # Examples
///
/// ```
/// use ndtranspose::inverse_axes;
///
/// assert_eq!(inverse_axes(&[2, 0, 1]), vec![1, 2, 0]);
/// assert_eq!(inverse_axes(&inverse_axes(&[3, 1, 0, 2])), vec![3, 1, 0, 2]);
/// ```
pub fn inverse_axes(axes: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; axes.len()];
    for (i, &axis) in axes.iter().enumerate() {
        inv[axis] = i;
    }
    inv
}

/// The reverse-all axis order `ndim-1, ..., 1, 0`.
pub fn reversed_axes(ndim: usize) -> Vec<usize> {
    (0..ndim).rev().collect()
}

/// Validate that `perm` is a permutation of `0..ndim`.
///
/// # Errors
///
/// Returns `TensorError::InvalidPermutation` on a length mismatch, an
/// out-of-range value, or a duplicate.
pub fn validate_permutation(perm: &[usize], ndim: usize) -> Result<(), TensorError> {
    let invalid = || TensorError::InvalidPermutation {
        perm: perm.to_vec(),
        ndim,
    };

    if perm.len() != ndim {
        return Err(invalid());
    }

    let mut seen = vec![false; ndim];
    for &p in perm {
        if p >= ndim || seen[p] {
            return Err(invalid());
        }
        seen[p] = true;
    }

    Ok(())
}
