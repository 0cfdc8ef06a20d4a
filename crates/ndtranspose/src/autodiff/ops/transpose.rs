//! Differentiable axis permutation.
//!
//! Forward permutes the input axes; backward applies the inverse permutation
//! to the output gradient. With no explicit axes every axis is reversed, and
//! since reversal is its own inverse the backward pass reverses again.

use log::{debug, trace};

use crate::autodiff::function::{Function, expect_single};
use crate::autodiff::graph::{GradFn, GraphScalar, NodeId, NodeRef};
use crate::autodiff::tensor::TrackedTensor;
use crate::error::TensorError;
use crate::operations::{permutedims, reverse_dims, transpose_with};
use crate::permutation::AxisPermutation;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// The transpose operator.
///
/// Holds an immutable [`AxisPermutation`]; for explicit axes the inverse is
/// computed once here and reused by every backward call.
///
/// # Example
///
/// ```
/// use ndtranspose::DenseTensor;
/// use ndtranspose::autodiff::{Function, Transpose};
///
/// let op = Transpose::new(Some(vec![2, 0, 1])).unwrap();
/// assert_eq!(op.inv_axes(), Some(&[1, 2, 0][..]));
///
/// let x: DenseTensor<f32> = DenseTensor::zeros(&[2, 3, 4]);
/// let y = op.forward(&[&x]).unwrap();
/// assert_eq!(y[0].shape(), &[4, 2, 3]);
///
/// let gy: DenseTensor<f32> = DenseTensor::ones(&[4, 2, 3]);
/// let gx = op.backward(&[&x], &[&gy]).unwrap();
/// assert_eq!(gx[0].shape(), &[2, 3, 4]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpose {
    perm: AxisPermutation,
}

impl Transpose {
    /// Create the operator; `None` reverses all axes.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidPermutation` if `axes` is not a
    /// permutation of `0..axes.len()`.
    pub fn new(axes: Option<Vec<usize>>) -> Result<Self, TensorError> {
        let perm = AxisPermutation::new(axes)?;
        debug!("Transpose::new {:?}", perm);
        Ok(Self { perm })
    }

    /// Create the operator from an already validated permutation.
    pub fn from_permutation(perm: AxisPermutation) -> Self {
        Self { perm }
    }

    /// The permutation applied by `forward`.
    pub fn permutation(&self) -> &AxisPermutation {
        &self.perm
    }

    /// Explicit axes, or `None` for reverse-all.
    pub fn axes(&self) -> Option<&[usize]> {
        self.perm.axes()
    }

    /// Cached inverse axes, or `None` for reverse-all.
    pub fn inv_axes(&self) -> Option<&[usize]> {
        self.perm.inverse_axes()
    }

    /// Shape of the forward output for an input of shape `input_shape`.
    pub fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, TensorError> {
        self.perm.permuted_shape(input_shape)
    }

    /// Forward pass on a single tensor.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidPermutation` if explicit axes do not match
    /// the input rank.
    pub fn apply<T: Scalar>(&self, input: &DenseTensor<T>) -> Result<DenseTensor<T>, TensorError> {
        trace!("Transpose forward {:?}", input.shape());
        transpose_with(input, &self.perm)
    }

    /// Backward pass given only the input shape.
    ///
    /// The result has shape `input_shape`.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if `grad_output` does not have the
    /// forward output shape, or `TensorError::InvalidPermutation` if explicit
    /// axes do not match the input rank.
    pub fn input_grad<T: Scalar>(
        &self,
        grad_output: &DenseTensor<T>,
        input_shape: &[usize],
    ) -> Result<DenseTensor<T>, TensorError> {
        let expected = self.output_shape(input_shape)?;
        if grad_output.shape() != expected.as_slice() {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: grad_output.shape().to_vec(),
            });
        }

        trace!("Transpose backward {:?}", grad_output.shape());
        match self.perm.inverse_axes() {
            Some(inverse) => permutedims(grad_output, inverse),
            None => Ok(reverse_dims(grad_output)),
        }
    }
}

impl<T: Scalar> Function<T> for Transpose {
    fn forward(&self, inputs: &[&DenseTensor<T>]) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let x = expect_single(inputs)?;
        Ok(vec![self.apply(x)?])
    }

    fn backward(
        &self,
        inputs: &[&DenseTensor<T>],
        grad_outputs: &[&DenseTensor<T>],
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let x = expect_single(inputs)?;
        let gy = expect_single(grad_outputs)?;
        Ok(vec![self.input_grad(gy, x.shape())?])
    }
}

/// Tape node for [`tracked_transpose`].
///
/// Keeps only the input shape, not the input tensor.
#[derive(Debug)]
pub struct TransposeBackward {
    op: Transpose,
    input_shape: Vec<usize>,
    input_id: NodeId,
}

impl<T: Scalar> GradFn<T> for TransposeBackward {
    fn backward(
        &self,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<(NodeId, DenseTensor<T>)>, TensorError> {
        let grad_input = self.op.input_grad(grad_output, &self.input_shape)?;
        Ok(vec![(self.input_id, grad_input)])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input_id]
    }

    fn name(&self) -> &'static str {
        "TransposeBackward"
    }
}

/// Tracked axis permutation.
///
/// Reverses all axes when `axes` is `None`; otherwise output axis `k` is
/// input axis `axes[k]`. Records a backward node when `x` requires grad.
///
/// # Errors
///
/// Returns `TensorError::InvalidPermutation` if `axes` is not a permutation
/// of `0..x.ndim()`, and `TensorError::InvalidOperation` if `x` was recorded
/// in a graph that has since been cleared.
///
/// # Example
///
/// ```
/// use ndtranspose::autodiff::{TrackedTensor, backward_with_grad, clear_graph, tracked_transpose};
/// use ndtranspose::DenseTensor;
///
/// clear_graph();
///
/// let x = TrackedTensor::leaf(DenseTensor::<f64>::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap());
/// let y = tracked_transpose(&x, None).unwrap();
/// assert_eq!(y.shape(), &[3, 2]);
///
/// let gy = DenseTensor::from_vec(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0], &[3, 2]).unwrap();
/// let grads = backward_with_grad(&y, gy.clone()).unwrap();
/// let gx = grads.get(x.node_id().unwrap()).unwrap();
/// assert_eq!(gx.shape(), &[2, 3]);
/// assert_eq!(gx.get(&[1, 2]), gy.get(&[2, 1]));
/// ```
pub fn tracked_transpose<T: GraphScalar>(
    x: &TrackedTensor<T>,
    axes: Option<&[usize]>,
) -> Result<TrackedTensor<T>, TensorError> {
    let op = Transpose::new(axes.map(<[usize]>::to_vec))?;
    let result = op.apply(x.tensor())?;

    let Some(input_id) = x.node_id() else {
        return Ok(TrackedTensor::new(result));
    };

    let backward = TransposeBackward {
        op,
        input_shape: x.shape().to_vec(),
        input_id,
    };
    let node = T::with_graph(|g| -> Result<NodeRef<T>, TensorError> {
        if !g.contains(input_id) {
            return Err(TensorError::InvalidOperation(
                "tracked_transpose() input belongs to a cleared computation graph".to_string(),
            ));
        }
        Ok(g.create_node(Box::new(backward), true))
    })?;

    Ok(TrackedTensor::from_tensor_with_grad(result, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::backward::backward_with_grad;
    use crate::autodiff::graph::clear_graph;
    use crate::random::random_permutation;
    use crate::scalar::c64;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn iota(shape: &[usize]) -> DenseTensor<f32> {
        let mut t = DenseTensor::zeros(shape);
        for (i, x) in t.data_mut().iter_mut().enumerate() {
            *x = i as f32;
        }
        t
    }

    #[test]
    fn test_construct_caches_inverse() {
        let op = Transpose::new(Some(vec![2, 0, 1])).unwrap();
        assert_eq!(op.axes(), Some(&[2, 0, 1][..]));
        assert_eq!(op.inv_axes(), Some(&[1, 2, 0][..]));

        let rev = Transpose::new(None).unwrap();
        assert_eq!(rev.axes(), None);
        assert_eq!(rev.inv_axes(), None);
    }

    #[test]
    fn test_construct_rejects_duplicates() {
        assert_eq!(
            Transpose::new(Some(vec![0, 0, 1])).unwrap_err(),
            TensorError::InvalidPermutation {
                perm: vec![0, 0, 1],
                ndim: 3
            }
        );
    }

    #[test]
    fn test_forward_explicit_shape_and_values() {
        let op = Transpose::new(Some(vec![2, 0, 1])).unwrap();
        let x = iota(&[2, 3, 4]);

        let y = op.forward(&[&x]).unwrap();
        assert_eq!(y.len(), 1);
        assert_eq!(y[0].shape(), &[4, 2, 3]);

        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(x.get(&[i, j, k]), y[0].get(&[k, i, j]));
                }
            }
        }
    }

    #[test]
    fn test_forward_reverse_all_matrix() {
        let op = Transpose::new(None).unwrap();
        let x = iota(&[2, 3]);

        let y = &op.forward(&[&x]).unwrap()[0];
        assert_eq!(y.shape(), &[3, 2]);
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(y.get(&[i, j]), x.get(&[j, i]));
            }
        }
    }

    #[test]
    fn test_reverse_all_is_involution() {
        let op = Transpose::new(None).unwrap();
        let x = iota(&[2, 3, 4, 1]);

        let y = op.apply(&x).unwrap();
        assert_eq!(y.shape(), &[1, 4, 3, 2]);
        assert_eq!(op.apply(&y).unwrap(), x);
    }

    #[test]
    fn test_backward_explicit() {
        let op = Transpose::new(Some(vec![2, 0, 1])).unwrap();
        let x = iota(&[2, 3, 4]);
        let gy = iota(&[4, 2, 3]);

        let gx = &op.backward(&[&x], &[&gy]).unwrap()[0];
        assert_eq!(gx.shape(), &[2, 3, 4]);

        // gradient at output position (k, i, j) flows back to input (i, j, k)
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(gx.get(&[i, j, k]), gy.get(&[k, i, j]));
                }
            }
        }
    }

    #[test]
    fn test_backward_of_forward_is_identity() {
        let mut rng = StdRng::seed_from_u64(3);
        for ndim in 0..5 {
            let shape: Vec<usize> = (1..=ndim).collect();
            let x: DenseTensor<f32> = DenseTensor::random_with_rng(&shape, &mut rng);
            let op = Transpose::from_permutation(random_permutation(ndim, &mut rng).unwrap());

            let y = op.apply(&x).unwrap();
            let back = op.input_grad(&y, x.shape()).unwrap();
            assert_eq!(back, x);
        }
    }

    #[test]
    fn test_element_type_agnostic() {
        let op = Transpose::new(Some(vec![1, 0])).unwrap();
        let x = DenseTensor::from_vec(
            vec![c64::new(1.0, 1.0), c64::new(2.0, 0.0), c64::new(0.0, 3.0)],
            &[3, 1],
        )
        .unwrap();

        let y = op.apply(&x).unwrap();
        assert_eq!(y.shape(), &[1, 3]);
        assert_eq!(y.data(), x.data());
    }

    #[test]
    fn test_forward_input_count() {
        let op = Transpose::new(None).unwrap();
        let x = iota(&[2, 2]);

        assert_eq!(
            op.forward(&[&x, &x]).unwrap_err(),
            TensorError::InvalidInputCount {
                expected: 1,
                actual: 2
            }
        );
        assert!(matches!(
            Function::<f32>::forward(&op, &[]),
            Err(TensorError::InvalidInputCount { actual: 0, .. })
        ));
        assert!(matches!(
            op.backward(&[&x], &[]),
            Err(TensorError::InvalidInputCount { actual: 0, .. })
        ));
    }

    #[test]
    fn test_forward_rank_mismatch() {
        let op = Transpose::new(Some(vec![1, 0])).unwrap();
        let x = iota(&[2, 3, 4]);
        assert_eq!(
            op.forward(&[&x]).unwrap_err(),
            TensorError::InvalidPermutation {
                perm: vec![1, 0],
                ndim: 3
            }
        );
    }

    #[test]
    fn test_backward_shape_mismatch() {
        let op = Transpose::new(Some(vec![2, 0, 1])).unwrap();
        let x = iota(&[2, 3, 4]);
        // the input shape, not the forward output shape
        let gy = iota(&[2, 3, 4]);

        assert_eq!(
            op.backward(&[&x], &[&gy]).unwrap_err(),
            TensorError::ShapeMismatch {
                expected: vec![4, 2, 3],
                actual: vec![2, 3, 4]
            }
        );
    }

    #[test]
    fn test_operator_is_reusable() {
        let op = Transpose::new(Some(vec![1, 2, 0])).unwrap();
        for shape in [[2, 3, 4], [5, 1, 2]] {
            let x = iota(&shape);
            let y = op.apply(&x).unwrap();
            assert_eq!(op.input_grad(&y, &shape).unwrap(), x);
        }
    }

    #[test]
    fn test_tracked_transpose_records_node() {
        clear_graph();

        let x = TrackedTensor::leaf(iota(&[2, 3, 4]));
        let y = tracked_transpose(&x, Some(&[2, 0, 1][..])).unwrap();
        assert!(y.requires_grad());
        assert_eq!(y.shape(), &[4, 2, 3]);

        let gy = iota(&[4, 2, 3]);
        let grads = backward_with_grad(&y, gy.clone()).unwrap();
        let gx = grads.get(x.node_id().unwrap()).unwrap();
        assert_eq!(gx, &permutedims(&gy, &[1, 2, 0]).unwrap());
    }

    #[test]
    fn test_tracked_transpose_no_grad() {
        clear_graph();

        let x = TrackedTensor::new(iota(&[2, 3]));
        let y = tracked_transpose(&x, None).unwrap();
        assert!(!y.requires_grad());
        assert_eq!(f32::with_graph(|g| g.len()), 0);
    }

    #[test]
    fn test_tracked_transpose_invalid_axes() {
        clear_graph();

        let x = TrackedTensor::leaf(iota(&[2, 3, 4]));
        assert!(matches!(
            tracked_transpose(&x, Some(&[0, 0, 1][..])),
            Err(TensorError::InvalidPermutation { .. })
        ));
        // nothing recorded beyond the leaf
        assert_eq!(f32::with_graph(|g| g.len()), 1);
    }

    #[test]
    fn test_transpose_is_send_sync() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Transpose>();
        assert_send_sync::<AxisPermutation>();
    }

    #[test]
    fn test_explicit_permutation_keeps_inverse_consistent() {
        // the only way in is validation, so the backward shape law holds
        let perm = AxisPermutation::explicit(vec![2, 0, 1]).unwrap();
        let op = Transpose::from_permutation(perm);
        assert_eq!(op.permutation().axes(), Some(&[2, 0, 1][..]));
        assert_eq!(op.permutation().inverse_axes(), Some(&[1, 2, 0][..]));
        let x = iota(&[2, 3, 4]);
        let gy = iota(&[4, 2, 3]);

        let gx = &op.backward(&[&x], &[&gy]).unwrap()[0];
        assert_eq!(gx.shape(), &[2, 3, 4]);

        assert!(matches!(
            AxisPermutation::explicit(vec![0, 5]),
            Err(TensorError::InvalidPermutation { .. })
        ));
    }

    #[test]
    fn test_tracked_transpose_rejects_cleared_input() {
        clear_graph();

        let stale = TrackedTensor::leaf(iota(&[2, 3]));
        clear_graph();
        let _fresh = TrackedTensor::leaf(iota(&[2, 3]));

        assert!(matches!(
            tracked_transpose(&stale, None),
            Err(TensorError::InvalidOperation(_))
        ));
        // only the fresh leaf is recorded
        assert_eq!(f32::with_graph(|g| g.len()), 1);
    }
}
