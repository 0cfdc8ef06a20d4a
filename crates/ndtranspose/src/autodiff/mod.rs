//! Reverse-mode automatic differentiation for axis permutations.
//!
//! Tape-based AD with a thread-local computation graph per element type.
//!
//! # Architecture
//!
//! ```text
//! TrackedTensor<T>  ──registers in──►  ComputationGraph<T> (thread_local)
//!        │                                      │
//!        ▼                                      ▼
//!   DenseTensor<T>                       Vec<Node<T>>
//!                                              │
//!                                              ▼
//!                               TransposeBackward (GradFn trait)
//!                                              │
//!                                  Transpose (Function trait)
//! ```
//!
//! [`Transpose`] can also be driven directly through the [`Function`] trait,
//! without any graph.
//!
//! # Example
//!
//! ```
//! use ndtranspose::autodiff::{TrackedTensor, backward_with_grad, clear_graph, tracked_transpose};
//! use ndtranspose::DenseTensor;
//!
//! // Clear the graph for a fresh computation
//! clear_graph();
//!
//! let x = TrackedTensor::leaf(DenseTensor::<f64>::ones(&[2, 3, 4]));
//!
//! // y[k, i, j] = x[i, j, k]
//! let y = tracked_transpose(&x, Some(&[2, 0, 1][..])).unwrap();
//! assert_eq!(y.shape(), &[4, 2, 3]);
//!
//! // dL/dy of the output shape; dL/dx comes back in the input shape
//! let grads = backward_with_grad(&y, DenseTensor::ones(&[4, 2, 3])).unwrap();
//! let gx = grads.get(x.node_id().unwrap()).unwrap();
//! assert_eq!(gx.shape(), &[2, 3, 4]);
//! ```
//!
//! # Key Types
//!
//! - [`Transpose`]: The permutation operator, with cached inverse axes
//! - [`TrackedTensor`]: Tensor with gradient tracking
//! - [`backward`] / [`backward_with_grad`]: Execute the backward pass
//! - [`Gradients`]: Container for accumulated gradients
//!
//! # Design Notes
//!
//! - Thread-local graphs, one per element type (`f32`, `f64`)
//! - Backward nodes keep only the input shape, not the input data
//! - Gradients for nodes reached along several paths are summed

mod backward;
mod function;
mod gradients;
mod graph;
mod ops;
mod tensor;

pub use backward::{backward, backward_with_grad};
pub use function::{Function, expect_single};
pub use gradients::Gradients;
pub use graph::{
    ComputationGraph, GradFn, GraphScalar, Node, NodeId, NodeRef, clear_graph, with_graph,
};
pub use ops::{Transpose, TransposeBackward, tracked_transpose};
pub use tensor::TrackedTensor;
