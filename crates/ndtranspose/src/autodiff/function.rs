//! The forward/backward contract shared by differentiable operators.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use std::fmt::Debug;

/// A differentiable operator.
///
/// An engine drives every operator through the same two calls: `forward`
/// maps input tensors to output tensors, and `backward` maps the output
/// gradients (plus the forward inputs, for shape context) to one gradient
/// per input.
pub trait Function<T: Scalar>: Debug {
    /// Compute the outputs from the inputs.
    fn forward(&self, inputs: &[&DenseTensor<T>]) -> Result<Vec<DenseTensor<T>>, TensorError>;

    /// Compute the input gradients from the output gradients.
    fn backward(
        &self,
        inputs: &[&DenseTensor<T>],
        grad_outputs: &[&DenseTensor<T>],
    ) -> Result<Vec<DenseTensor<T>>, TensorError>;
}

/// Return the single tensor in `tensors`.
///
/// # Errors
///
/// Returns `TensorError::InvalidInputCount` unless exactly one tensor is given.
pub fn expect_single<'a, T: Scalar>(
    tensors: &[&'a DenseTensor<T>],
) -> Result<&'a DenseTensor<T>, TensorError> {
    match tensors {
        [only] => Ok(*only),
        _ => Err(TensorError::InvalidInputCount {
            expected: 1,
            actual: tensors.len(),
        }),
    }
}
