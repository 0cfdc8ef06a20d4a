//! Tracked tensor operations with automatic differentiation.
//!
//! Each operation here computes its forward result and, when the input
//! requires grad, records a backward node in the thread-local graph.

mod transpose;

pub use transpose::{Transpose, TransposeBackward, tracked_transpose};
