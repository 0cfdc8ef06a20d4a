//! ndtranspose - differentiable axis permutation for dense tensors
//!
//! This crate provides column-major dense tensors, axis permutation with a
//! pluggable kernel backend, and a `Transpose` operator whose backward pass
//! applies the inverse permutation to the output gradient.
//!
//! # Architecture
//!
//! ```text
//! Level 1: High-level API (operations module)
//!     → permutedims, reverse_dims, transpose
//!
//! Level 2: In-place API
//!     → permutedims_into
//!
//! Level 3: Backend implementation (backend module)
//!     → GenericBackend (naive loops)
//!
//! Autodiff (feature = "autodiff")
//!     → Transpose (Function trait), tracked_transpose, backward
//! ```
//!
//! # Example
//!
//! ```
//! use ndtranspose::{AxisPermutation, DenseTensor, Tensor};
//!
//! // Create from data (column-major order)
//! let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let t: DenseTensor<f64> = Tensor::from_vec(data, &[2, 3]).unwrap();
//!
//! // Reverse all axes
//! let r = t.reverse_dims();
//! assert_eq!(r.shape(), &[3, 2]);
//! assert_eq!(r.get(&[2, 1]), t.get(&[1, 2]));
//!
//! // Explicit permutation with its cached inverse
//! let p = AxisPermutation::new(Some(vec![1, 0])).unwrap();
//! let back = t.permute(&p).unwrap().permute(&p.inverse()).unwrap();
//! assert_eq!(back, t);
//! ```

#[cfg(feature = "autodiff")]
pub mod autodiff;
pub mod backend;
pub mod error;
pub mod operations;
pub mod permutation;
pub mod random;
pub mod scalar;
pub mod strides;
pub mod tensor;

pub use error::TensorError;
pub use permutation::{AxisPermutation, inverse_axes};
pub use scalar::{Scalar, c32, c64};
pub use tensor::{DenseTensor, Tensor};

#[cfg(feature = "autodiff")]
pub use autodiff::{Transpose, tracked_transpose};
