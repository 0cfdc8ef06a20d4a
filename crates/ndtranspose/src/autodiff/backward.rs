//! Backward pass execution for reverse-mode automatic differentiation.

use log::{debug, trace};

use super::gradients::Gradients;
use super::graph::{ComputationGraph, GraphScalar, NodeId};
use super::tensor::TrackedTensor;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Execute the backward pass from a scalar loss.
///
/// Seeds the loss gradient with one and returns the accumulated gradients of
/// every leaf reachable from the loss.
///
/// # Errors
///
/// Returns error if:
/// - the loss does not have exactly one element
/// - the loss is not in the computation graph
/// - a node's backward function fails
pub fn backward<T: GraphScalar>(loss: &TrackedTensor<T>) -> Result<Gradients<T>, TensorError> {
    if loss.len() != 1 {
        return Err(TensorError::InvalidOperation(format!(
            "backward() requires scalar loss, got {} elements",
            loss.len()
        )));
    }
    backward_with_grad(loss, DenseTensor::ones(loss.shape()))
}

/// Execute the backward pass from an arbitrary output with a given gradient.
///
/// `grad_output` plays the role of dL/d(output); the returned container holds
/// dL/d(leaf) for every leaf reachable from `output`. Leaves created without
/// `requires_grad` receive no gradient.
///
/// # Errors
///
/// Returns `TensorError::ShapeMismatch` if `grad_output` does not have the
/// output's shape, and `TensorError::InvalidOperation` if `output` is not in
/// the computation graph (or belongs to one cleared since).
///
/// # Example
///
/// ```
/// use ndtranspose::autodiff::{TrackedTensor, backward_with_grad, clear_graph, tracked_transpose};
/// use ndtranspose::DenseTensor;
///
/// clear_graph();
/// let x = TrackedTensor::leaf(DenseTensor::<f64>::zeros(&[2, 3, 4]));
/// let y = tracked_transpose(&x, Some(&[2, 0, 1][..])).unwrap();
///
/// let grads = backward_with_grad(&y, DenseTensor::ones(&[4, 2, 3])).unwrap();
/// assert_eq!(grads.get(x.node_id().unwrap()).unwrap().shape(), &[2, 3, 4]);
/// ```
pub fn backward_with_grad<T: GraphScalar>(
    output: &TrackedTensor<T>,
    grad_output: DenseTensor<T>,
) -> Result<Gradients<T>, TensorError> {
    if grad_output.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            expected: output.shape().to_vec(),
            actual: grad_output.shape().to_vec(),
        });
    }

    let root = output.node_id().ok_or_else(|| {
        TensorError::InvalidOperation(
            "backward() called on tensor not in computation graph".to_string(),
        )
    })?;

    T::with_graph(|graph| -> Result<Gradients<T>, TensorError> {
        if !graph.contains(root) {
            return Err(TensorError::InvalidOperation(
                "backward() called on tensor from a cleared computation graph".to_string(),
            ));
        }

        let order = topological_order(graph, root);
        debug!(
            "backward from node {} over {} reachable nodes",
            root.index(),
            order.len()
        );

        let mut gradients = Gradients::new();
        gradients.accumulate(root, grad_output)?;

        for node_id in order {
            let Some(grad) = gradients.remove(node_id) else {
                continue;
            };
            let Some(node) = graph.get_node(node_id) else {
                continue;
            };

            match node.grad_fn() {
                Some(grad_fn) => {
                    trace!("node {}: {}", node_id.index(), grad_fn.name());
                    for (input_id, input_grad) in grad_fn.backward(&grad)? {
                        gradients.accumulate(input_id, input_grad)?;
                    }
                }
                // Leaf: keep the gradient for the caller.
                None if node.requires_grad() => gradients.accumulate(node_id, grad)?,
                None => trace!("node {}: leaf without grad, dropped", node_id.index()),
            }
        }

        Ok(gradients)
    })
}

/// Nodes reachable from `start`, ordered so that every node precedes its
/// inputs.
///
/// Inputs are always created before their consumers, so descending id order
/// is a valid reverse topological order.
fn topological_order<T: Scalar>(graph: &ComputationGraph<T>, start: NodeId) -> Vec<NodeId> {
    let mut visited = vec![false; graph.len()];
    let mut stack = vec![start];
    let mut result = Vec::new();

    while let Some(node_id) = stack.pop() {
        let Some(node) = graph.get_node(node_id) else {
            continue;
        };
        match visited.get_mut(node_id.index()) {
            Some(seen) if !*seen => *seen = true,
            _ => continue,
        }
        result.push(node_id);

        if let Some(grad_fn) = node.grad_fn() {
            stack.extend(grad_fn.inputs());
        }
    }

    result.sort_unstable_by(|a, b| b.cmp(a));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::graph::{GradFn, NodeRef, clear_graph};

    #[derive(Debug)]
    struct ScaleBackward {
        input_id: NodeId,
        scale: f64,
    }

    impl GradFn<f64> for ScaleBackward {
        fn backward(
            &self,
            grad_output: &DenseTensor<f64>,
        ) -> Result<Vec<(NodeId, DenseTensor<f64>)>, TensorError> {
            let scaled: Vec<f64> = grad_output.data().iter().map(|&x| x * self.scale).collect();
            Ok(vec![(
                self.input_id,
                DenseTensor::from_vec(scaled, grad_output.shape())?,
            )])
        }

        fn inputs(&self) -> Vec<NodeId> {
            vec![self.input_id]
        }
    }

    #[derive(Debug)]
    struct FanInBackward {
        input_ids: Vec<NodeId>,
    }

    impl GradFn<f64> for FanInBackward {
        fn backward(
            &self,
            grad_output: &DenseTensor<f64>,
        ) -> Result<Vec<(NodeId, DenseTensor<f64>)>, TensorError> {
            Ok(self
                .input_ids
                .iter()
                .map(|&id| (id, grad_output.clone()))
                .collect())
        }

        fn inputs(&self) -> Vec<NodeId> {
            self.input_ids.clone()
        }
    }

    fn scale(input_id: NodeId, scale: f64) -> NodeRef<f64> {
        f64::with_graph(|g| g.create_node(Box::new(ScaleBackward { input_id, scale }), true))
    }

    #[test]
    fn test_backward_chain() {
        clear_graph();

        // leaf -> scale(2) -> scale(3) -> loss
        let leaf = f64::with_graph(|g| g.create_leaf(true)).id();
        let n1 = scale(leaf, 2.0).id();
        let n2 = scale(n1, 3.0);
        let loss = TrackedTensor::from_tensor_with_grad(DenseTensor::ones(&[1]), n2);

        let grads = backward(&loss).unwrap();
        assert_eq!(grads.get(leaf).unwrap().data(), &[6.0]);
        // intermediate gradients are consumed
        assert!(!grads.contains(n1));
        assert_eq!(grads.len(), 1);
    }

    #[test]
    fn test_backward_diamond_accumulates() {
        clear_graph();

        //        ┌─ scale(2) ─┐
        // leaf ──┤            ├── fan-in -> loss
        //        └─ scale(5) ─┘
        let leaf = f64::with_graph(|g| g.create_leaf(true)).id();
        let left = scale(leaf, 2.0).id();
        let right = scale(leaf, 5.0).id();
        let join = f64::with_graph(|g| {
            g.create_node(
                Box::new(FanInBackward {
                    input_ids: vec![left, right],
                }),
                true,
            )
        });
        let loss = TrackedTensor::from_tensor_with_grad(DenseTensor::ones(&[1]), join);

        let grads = backward(&loss).unwrap();
        assert_eq!(grads.get(leaf).unwrap().data(), &[7.0]);
    }

    #[test]
    fn test_backward_non_scalar_error() {
        clear_graph();

        let leaf = f64::with_graph(|g| g.create_leaf(true));
        let loss = TrackedTensor::from_tensor_with_grad(DenseTensor::ones(&[3]), leaf);

        assert!(matches!(
            backward(&loss),
            Err(TensorError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_backward_not_in_graph_error() {
        clear_graph();

        let loss = TrackedTensor::new(DenseTensor::<f64>::ones(&[1]));
        assert!(matches!(
            backward(&loss),
            Err(TensorError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_backward_with_grad_shape_mismatch() {
        clear_graph();

        let leaf = TrackedTensor::leaf(DenseTensor::<f64>::zeros(&[2, 3]));
        let err = backward_with_grad(&leaf, DenseTensor::zeros(&[3, 2])).unwrap_err();
        assert_eq!(
            err,
            TensorError::ShapeMismatch {
                expected: vec![2, 3],
                actual: vec![3, 2]
            }
        );
    }

    #[test]
    fn test_backward_on_leaf_returns_seed() {
        clear_graph();

        let leaf = TrackedTensor::leaf(DenseTensor::<f32>::zeros(&[2]));
        let seed = DenseTensor::from_vec(vec![0.5, -1.5], &[2]).unwrap();
        let grads = backward_with_grad(&leaf, seed).unwrap();
        assert_eq!(grads.get(leaf.node_id().unwrap()).unwrap().data(), &[0.5, -1.5]);
    }

    #[test]
    fn test_backward_skips_leaves_without_grad() {
        clear_graph();

        let tracked = f64::with_graph(|g| g.create_leaf(true)).id();
        let frozen = f64::with_graph(|g| g.create_leaf(false)).id();
        let join = f64::with_graph(|g| {
            g.create_node(
                Box::new(FanInBackward {
                    input_ids: vec![tracked, frozen],
                }),
                true,
            )
        });
        let loss = TrackedTensor::from_tensor_with_grad(DenseTensor::ones(&[1]), join);

        let grads = backward(&loss).unwrap();
        assert_eq!(grads.get(tracked).unwrap().data(), &[1.0]);
        assert!(!grads.contains(frozen));
        assert_eq!(grads.len(), 1);
    }

    #[test]
    fn test_backward_after_clear_error() {
        clear_graph();

        let stale = TrackedTensor::leaf(DenseTensor::<f64>::ones(&[1]));
        clear_graph();
        // a new node now occupies the stale tensor's slot
        let fresh = TrackedTensor::leaf(DenseTensor::<f64>::ones(&[1]));
        assert_eq!(
            stale.node_id().unwrap().index(),
            fresh.node_id().unwrap().index()
        );

        assert!(matches!(
            backward(&stale),
            Err(TensorError::InvalidOperation(_))
        ));
        assert!(backward(&fresh).is_ok());
    }
}
