//! Generic (naive loop-based) backend implementation.

use super::PermutationBackend;
use crate::scalar::Scalar;
use crate::strides::{cartesian_to_linear, linear_to_cartesian_into};
use crate::tensor::DenseTensor;

/// Generic backend using naive loops.
///
/// Walks the source in storage order and scatters each element to its
/// permuted position in the destination.
pub struct GenericBackend;

impl PermutationBackend for GenericBackend {
    fn permute_into<ElT: Scalar>(
        dest: &mut DenseTensor<ElT>,
        src: &DenseTensor<ElT>,
        perm: &[usize],
    ) {
        debug_assert_eq!(dest.len(), src.len());

        let src_shape = src.shape();
        // dest strides read through the source axis order: moving one step
        // along source axis `perm[i]` moves `dest_strides[i]` in dest.
        let mut strides_by_src_axis = vec![0; perm.len()];
        for (i, &p) in perm.iter().enumerate() {
            strides_by_src_axis[p] = dest.strides()[i];
        }

        let mut src_indices = vec![0; src.ndim()];
        let dest_data = dest.data_mut();
        for (linear_src, &value) in src.data().iter().enumerate() {
            linear_to_cartesian_into(linear_src, src_shape, &mut src_indices);
            let linear_dest = cartesian_to_linear(&src_indices, &strides_by_src_axis);
            dest_data[linear_dest] = value;
        }
    }
}
