//! Tensor operations.
//!
//! ```text
//! Level 1: High-level API (permutedims, reverse_dims, transpose)
//!     → validate permutation
//!     → allocate output
//!     → call in-place version
//!
//! Level 2: In-place API (permutedims_into)
//!     → dispatch to backend
//!
//! Level 3: Backend implementation (GenericBackend)
//! ```

mod elementwise;
mod permutedims;

pub use elementwise::{add, apply_binary};
pub use permutedims::{
    permutedims, permutedims_into, permutedims_with, reverse_dims, transpose, transpose_with,
};
