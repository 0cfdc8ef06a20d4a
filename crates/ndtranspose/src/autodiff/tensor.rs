//! Tensors that carry a handle into the computation graph.

use super::graph::{GraphScalar, NodeId, NodeRef};
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// A dense tensor plus, when it requires grad, the graph node that produced it.
///
/// Leaves come from [`TrackedTensor::leaf`]; tracked operations such as
/// `tracked_transpose` return tensors wired to their backward node. A tensor
/// from [`TrackedTensor::new`] is a constant: operations on it record nothing.
///
/// # Example
///
/// ```
/// use ndtranspose::autodiff::TrackedTensor;
/// use ndtranspose::Tensor;
///
/// let x = TrackedTensor::leaf(Tensor::<f32>::ones(&[2, 3]));
/// assert!(x.requires_grad());
///
/// let c = TrackedTensor::new(Tensor::<f32>::ones(&[3, 2]));
/// assert!(!c.requires_grad());
/// assert_eq!(c.node_id(), None);
/// ```
#[derive(Debug, Clone)]
pub struct TrackedTensor<T: Scalar> {
    tensor: DenseTensor<T>,
    node: Option<NodeRef<T>>,
}

impl<T: Scalar> TrackedTensor<T> {
    /// An untracked constant.
    pub fn new(tensor: DenseTensor<T>) -> Self {
        Self { tensor, node: None }
    }

    /// Pair a computed tensor with the node whose backward produces its
    /// input gradients.
    pub fn from_tensor_with_grad(tensor: DenseTensor<T>, node: NodeRef<T>) -> Self {
        Self {
            tensor,
            node: Some(node),
        }
    }

    pub fn tensor(&self) -> &DenseTensor<T> {
        &self.tensor
    }

    pub fn node_id(&self) -> Option<NodeId> {
        self.node.as_ref().map(NodeRef::id)
    }

    pub fn requires_grad(&self) -> bool {
        self.node.is_some()
    }

    pub fn shape(&self) -> &[usize] {
        self.tensor.shape()
    }

    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    pub fn data(&self) -> &[T] {
        self.tensor.data()
    }
}

impl<T: GraphScalar> TrackedTensor<T> {
    /// A leaf that requires grad, registered in this thread's graph.
    pub fn leaf(tensor: DenseTensor<T>) -> Self {
        let node = T::with_graph(|g| g.create_leaf(true));
        Self::from_tensor_with_grad(tensor, node)
    }
}
