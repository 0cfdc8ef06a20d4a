//! Permutation operations for tensors.
//!
//! ```text
//! transpose(tensor, axes)             # optional axes
//!     → Some(axes): permutedims(tensor, axes)
//!     → None:       reverse_dims(tensor)
//!
//! permutedims(tensor, perm)           # explicit axes
//!     → validate permutation
//!     → allocate output with permuted shape
//!     → permutedims_into(output, tensor, perm)
//!
//! permutedims_into(dest, src, perm)   # low-level backend dispatch
//!     → GenericBackend
//! ```

use log::trace;

use crate::backend::{GenericBackend, PermutationBackend};
use crate::error::TensorError;
use crate::permutation::{AxisPermutation, reversed_axes, validate_permutation};
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Permute the dimensions of a DenseTensor, returning a new DenseTensor.
///
/// `perm[i]` gives the source dimension for the i-th dimension of the result,
/// so `result.shape()[i] == tensor.shape()[perm[i]]`.
///
/// # Errors
///
/// Returns error if `perm` is not a valid permutation of `0..ndim`.
///
/// # Examples
///
/// ```
/// use ndtranspose::DenseTensor;
/// use ndtranspose::operations::permutedims;
///
/// let t: DenseTensor<f32> = DenseTensor::zeros(&[2, 3, 4]);
/// let t2 = permutedims(&t, &[2, 0, 1]).unwrap();
/// assert_eq!(t2.shape(), &[4, 2, 3]);
/// ```
pub fn permutedims<T: Scalar>(
    tensor: &DenseTensor<T>,
    perm: &[usize],
) -> Result<DenseTensor<T>, TensorError> {
    permutedims_with::<GenericBackend, T>(tensor, perm)
}

/// [`permutedims`] with an explicitly chosen backend.
pub fn permutedims_with<B: PermutationBackend, T: Scalar>(
    tensor: &DenseTensor<T>,
    perm: &[usize],
) -> Result<DenseTensor<T>, TensorError> {
    validate_permutation(perm, tensor.ndim())?;

    let new_shape: Vec<usize> = perm.iter().map(|&p| tensor.shape()[p]).collect();
    trace!(
        "permutedims {:?} -> {:?} (perm {:?})",
        tensor.shape(),
        new_shape,
        perm
    );

    let mut result = DenseTensor::zeros(&new_shape);
    B::permute_into(&mut result, tensor, perm);
    Ok(result)
}

/// Permute DenseTensor dimensions into an existing output tensor.
///
/// This is the low-level function that dispatches to the backend.
///
/// # Errors
///
/// Returns `TensorError::InvalidPermutation` if `perm` is not a permutation of
/// `0..src.ndim()`, and `TensorError::ShapeMismatch` if `dest` does not have
/// the permuted shape of `src`.
///
/// # Examples
///
/// ```
/// use ndtranspose::DenseTensor;
/// use ndtranspose::operations::permutedims_into;
///
/// let src: DenseTensor<f64> = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let mut dest: DenseTensor<f64> = DenseTensor::zeros(&[3, 2]);
///
/// permutedims_into(&mut dest, &src, &[1, 0]).unwrap();
/// assert_eq!(src.get(&[1, 2]), dest.get(&[2, 1]));
///
/// let mut wrong: DenseTensor<f64> = DenseTensor::zeros(&[2, 3]);
/// assert!(permutedims_into(&mut wrong, &src, &[1, 0]).is_err());
/// ```
pub fn permutedims_into<T: Scalar>(
    dest: &mut DenseTensor<T>,
    src: &DenseTensor<T>,
    perm: &[usize],
) -> Result<(), TensorError> {
    validate_permutation(perm, src.ndim())?;

    let expected: Vec<usize> = perm.iter().map(|&p| src.shape()[p]).collect();
    if dest.shape() != expected.as_slice() {
        return Err(TensorError::ShapeMismatch {
            expected,
            actual: dest.shape().to_vec(),
        });
    }

    GenericBackend::permute_into(dest, src, perm);
    Ok(())
}

/// Reverse the order of all dimensions.
///
/// `result.shape()` is `tensor.shape()` reversed, and
/// `result[i_{n-1}, ..., i_0] == tensor[i_0, ..., i_{n-1}]`.
pub fn reverse_dims<T: Scalar>(tensor: &DenseTensor<T>) -> DenseTensor<T> {
    let perm = reversed_axes(tensor.ndim());
    let new_shape: Vec<usize> = tensor.shape().iter().rev().copied().collect();

    let mut result = DenseTensor::zeros(&new_shape);
    GenericBackend::permute_into(&mut result, tensor, &perm);
    result
}

/// Apply an [`AxisPermutation`] to a tensor.
///
/// # Errors
///
/// Returns `TensorError::InvalidPermutation` if an explicit permutation does
/// not match the tensor rank.
pub fn transpose_with<T: Scalar>(
    tensor: &DenseTensor<T>,
    perm: &AxisPermutation,
) -> Result<DenseTensor<T>, TensorError> {
    transpose(tensor, perm.axes())
}

/// Permute tensor axes, reversing all of them when `axes` is `None`.
///
/// This is the untracked counterpart of `autodiff::tracked_transpose`.
///
/// # Errors
///
/// Returns `TensorError::InvalidPermutation` if `axes` is not a permutation of
/// `0..tensor.ndim()`.
///
/// # Examples
///
/// ```
/// use ndtranspose::DenseTensor;
/// use ndtranspose::operations::transpose;
///
/// let t: DenseTensor<f64> = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let tt = transpose(&t, None).unwrap();
/// assert_eq!(tt.shape(), &[3, 2]);
/// assert_eq!(tt.get(&[2, 1]), t.get(&[1, 2]));
/// ```
pub fn transpose<T: Scalar>(
    tensor: &DenseTensor<T>,
    axes: Option<&[usize]>,
) -> Result<DenseTensor<T>, TensorError> {
    match axes {
        Some(axes) => permutedims(tensor, axes),
        None => Ok(reverse_dims(tensor)),
    }
}
