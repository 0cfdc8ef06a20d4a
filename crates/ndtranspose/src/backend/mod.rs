//! Element-moving kernels behind axis permutation.
//!
//! The functions in `operations` validate the permutation and allocate the
//! output before dispatching here, so a kernel only relocates elements.
//! `permutedims_with::<B>` selects a kernel; everything else uses
//! [`GenericBackend`].

mod generic;

use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

pub use generic::GenericBackend;

/// A kernel that writes `src` permuted by `perm` into `dest`.
///
/// Preconditions, checked by every caller in this crate: `perm` is a
/// permutation of `0..src.ndim()` and `dest.shape()[k] == src.shape()[perm[k]]`.
pub trait PermutationBackend {
    fn permute_into<ElT: Scalar>(
        dest: &mut DenseTensor<ElT>,
        src: &DenseTensor<ElT>,
        perm: &[usize],
    );
}
