//! Element-wise tensor operations.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use std::ops::Add;

/// Apply a binary function element-wise to two tensors of the same shape.
///
/// # Errors
///
/// Returns `TensorError::ShapeMismatch` if the shapes differ.
///
/// # Example
///
/// ```
/// use ndtranspose::DenseTensor;
/// use ndtranspose::operations::apply_binary;
///
/// let a: DenseTensor<f64> = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
/// let b = DenseTensor::from_vec(vec![3.0, 4.0], &[2]).unwrap();
/// let c = apply_binary(&a, &b, |x, y| x * y).unwrap();
/// assert_eq!(c.data(), &[3.0, 8.0]);
/// ```
pub fn apply_binary<ElT: Scalar, F>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
    f: F,
) -> Result<DenseTensor<ElT>, TensorError>
where
    F: Fn(ElT, ElT) -> ElT,
{
    if a.shape() != b.shape() {
        return Err(TensorError::ShapeMismatch {
            expected: a.shape().to_vec(),
            actual: b.shape().to_vec(),
        });
    }
    let data: Vec<ElT> = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| f(x, y))
        .collect();
    DenseTensor::from_vec(data, a.shape())
}

/// Element-wise sum of two tensors of the same shape.
pub fn add<ElT: Scalar + Add<Output = ElT>>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<DenseTensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x + y)
}
