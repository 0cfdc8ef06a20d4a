//! Stride and index arithmetic.
//!
//! Tensors are stored in column-major (Fortran) order: the first index varies
//! fastest.

/// Number of elements held by a tensor of the given shape.
///
/// A rank-0 shape holds a single element; any zero extent gives zero elements.
///
/// # Examples
///
/// ```
/// use ndtranspose::strides::shape_len;
///
/// assert_eq!(shape_len(&[2, 3, 4]), 24);
/// assert_eq!(shape_len(&[]), 1);
/// assert_eq!(shape_len(&[3, 0]), 0);
/// ```
#[inline]
pub fn shape_len(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Compute column-major strides from shape.
///
/// For shape [d0, d1, d2, ...], returns strides [1, d0, d0*d1, ...].
///
/// # Examples
///
/// ```
/// use ndtranspose::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![1, 3, 12]);
/// assert_eq!(compute_strides(&[2, 3]), vec![1, 2]);
/// assert_eq!(compute_strides(&[]), Vec::<usize>::new());
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut stride = 1;

    for &dim in shape {
        strides.push(stride);
        stride *= dim;
    }

    strides
}

/// Convert cartesian indices to a linear offset.
#[inline]
pub fn cartesian_to_linear(indices: &[usize], strides: &[usize]) -> usize {
    indices
        .iter()
        .zip(strides)
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Convert a linear offset to cartesian indices, writing into `indices`.
///
/// `indices` must have the same length as `shape`. Reusing the buffer keeps
/// the permutation inner loop free of allocations.
#[inline]
pub fn linear_to_cartesian_into(mut linear: usize, shape: &[usize], indices: &mut [usize]) {
    for (idx, &dim) in indices.iter_mut().zip(shape) {
        *idx = linear % dim;
        linear /= dim;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_strides_3d() {
        assert_eq!(compute_strides(&[3, 4, 5]), vec![1, 3, 12]);
    }

    #[test]
    fn test_compute_strides_with_zero_extent() {
        assert_eq!(compute_strides(&[2, 0, 3]), vec![1, 2, 0]);
    }

    #[test]
    fn test_shape_len() {
        assert_eq!(shape_len(&[4, 2, 3]), 24);
        assert_eq!(shape_len(&[]), 1);
        assert_eq!(shape_len(&[0]), 0);
    }

    #[test]
    fn test_cartesian_to_linear() {
        let strides = compute_strides(&[3, 4, 5]);
        // index [i, j, k] -> i + 3*j + 12*k
        assert_eq!(cartesian_to_linear(&[0, 0, 0], &strides), 0);
        assert_eq!(cartesian_to_linear(&[1, 0, 0], &strides), 1);
        assert_eq!(cartesian_to_linear(&[0, 1, 0], &strides), 3);
        assert_eq!(cartesian_to_linear(&[0, 0, 1], &strides), 12);
        assert_eq!(
            cartesian_to_linear(&[2, 3, 4], &strides),
            2 + 3 * 3 + 4 * 12
        );
    }

    #[test]
    fn test_linear_to_cartesian_into() {
        let shape = [3, 4, 5];
        let mut idx = [9; 3];
        let cases = [(0, [0, 0, 0]), (1, [1, 0, 0]), (3, [0, 1, 0]), (12, [0, 0, 1])];
        for (linear, expected) in cases {
            linear_to_cartesian_into(linear, &shape, &mut idx);
            assert_eq!(idx, expected);
        }
    }

    #[test]
    fn test_roundtrip() {
        let shape = [3, 4, 5];
        let strides = compute_strides(&shape);
        let mut cartesian = [0; 3];

        for linear in 0..shape_len(&shape) {
            linear_to_cartesian_into(linear, &shape, &mut cartesian);
            assert_eq!(cartesian_to_linear(&cartesian, &strides), linear);
        }
    }
}
