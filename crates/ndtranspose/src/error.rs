//! Error types for ndtranspose.

use thiserror::Error;

/// Errors that can occur in tensor and autodiff operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    /// Data length does not match the number of elements implied by a shape.
    #[error("data length mismatch: expected {expected} elements, got {actual}")]
    DataLengthMismatch { expected: usize, actual: usize },

    /// Operand shape does not match the shape required by the operation.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for tensor with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Operator called with the wrong number of tensors.
    #[error("invalid input count: expected {expected} tensor(s), got {actual}")]
    InvalidInputCount { expected: usize, actual: usize },

    /// Misuse of the autodiff engine.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}
