//! Computation graph for reverse-mode automatic differentiation.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use std::cell::RefCell;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::Add;

/// Unique identifier for a node in the computation graph.
///
/// Ids are assigned in creation order, so every node's inputs have smaller
/// ids than the node itself. Each id is stamped with the graph generation it
/// was created in; clearing the graph starts a new generation, and ids from
/// an older one no longer resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    generation: u64,
    index: usize,
}

impl NodeId {
    /// Position in the graph's node list.
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(index: usize) -> Self {
        Self {
            generation: 0,
            index,
        }
    }
}

/// User-facing handle to a computation graph node.
#[derive(Debug, Clone)]
pub struct NodeRef<T: Scalar> {
    id: NodeId,
    _phantom: PhantomData<T>,
}

impl<T: Scalar> NodeRef<T> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// Backward function of a recorded node.
///
/// Computes gradients with respect to inputs given the gradient of the
/// output. Each tracked operation records one implementation of this trait.
pub trait GradFn<T: Scalar>: Debug {
    /// Compute the VJP: given `grad_output`, return gradients for each input.
    ///
    /// Returns `(NodeId, gradient)` pairs for inputs that require grad.
    fn backward(
        &self,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<(NodeId, DenseTensor<T>)>, TensorError>;

    /// Input node ids (for graph traversal).
    fn inputs(&self) -> Vec<NodeId>;

    /// Short name used in trace logs.
    fn name(&self) -> &'static str {
        "GradFn"
    }
}

/// A node in the computation graph.
#[derive(Debug)]
pub struct Node<T: Scalar> {
    /// `None` for leaf nodes.
    grad_fn: Option<Box<dyn GradFn<T>>>,
    requires_grad: bool,
}

impl<T: Scalar> Node<T> {
    pub fn grad_fn(&self) -> Option<&dyn GradFn<T>> {
        self.grad_fn.as_deref()
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }
}

/// Append-only tape of recorded operations.
pub struct ComputationGraph<T: Scalar> {
    nodes: Vec<Node<T>>,
    generation: u64,
}

impl<T: Scalar> ComputationGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generation: 0,
        }
    }

    /// Create a leaf node (an input tensor).
    pub fn create_leaf(&mut self, requires_grad: bool) -> NodeRef<T> {
        self.push(None, requires_grad)
    }

    /// Create a computed node with a backward function.
    pub fn create_node(&mut self, grad_fn: Box<dyn GradFn<T>>, requires_grad: bool) -> NodeRef<T> {
        self.push(Some(grad_fn), requires_grad)
    }

    fn push(&mut self, grad_fn: Option<Box<dyn GradFn<T>>>, requires_grad: bool) -> NodeRef<T> {
        let id = NodeId {
            generation: self.generation,
            index: self.nodes.len(),
        };
        self.nodes.push(Node {
            grad_fn,
            requires_grad,
        });
        NodeRef {
            id,
            _phantom: PhantomData,
        }
    }

    /// Look up a node; `None` for ids from an earlier generation.
    pub fn get_node(&self, id: NodeId) -> Option<&Node<T>> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Clear the graph (call after backward).
    ///
    /// Starts a new generation: ids handed out before the clear stop
    /// resolving instead of aliasing new nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T: Scalar> Default for ComputationGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Debug for ComputationGraph<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputationGraph")
            .field("num_nodes", &self.nodes.len())
            .finish()
    }
}

thread_local! {
    static GRAPH_F32: RefCell<ComputationGraph<f32>> = RefCell::new(ComputationGraph::new());
    static GRAPH_F64: RefCell<ComputationGraph<f64>> = RefCell::new(ComputationGraph::new());
}

/// Scalar types that own a thread-local computation graph.
///
/// Each thread has one independent graph per element type.
pub trait GraphScalar: Scalar + Add<Output = Self> {
    /// Run `f` with mutable access to this thread's graph.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside `f`.
    fn with_graph<R, F>(f: F) -> R
    where
        F: FnOnce(&mut ComputationGraph<Self>) -> R;
}

impl GraphScalar for f32 {
    fn with_graph<R, F>(f: F) -> R
    where
        F: FnOnce(&mut ComputationGraph<f32>) -> R,
    {
        GRAPH_F32.with(|g| f(&mut g.borrow_mut()))
    }
}

impl GraphScalar for f64 {
    fn with_graph<R, F>(f: F) -> R
    where
        F: FnOnce(&mut ComputationGraph<f64>) -> R,
    {
        GRAPH_F64.with(|g| f(&mut g.borrow_mut()))
    }
}

/// Access the thread-local computation graph for `T`.
///
/// # Example
///
/// ```
/// use ndtranspose::autodiff::with_graph;
///
/// let node = with_graph::<f64, _, _>(|graph| graph.create_leaf(true));
/// assert!(with_graph::<f64, _, _>(|graph| graph.get_node(node.id()).is_some()));
/// ```
pub fn with_graph<T: GraphScalar, R, F>(f: F) -> R
where
    F: FnOnce(&mut ComputationGraph<T>) -> R,
{
    T::with_graph(f)
}

/// Clear this thread's computation graphs for every element type.
pub fn clear_graph() {
    f32::with_graph(|g| g.clear());
    f64::with_graph(|g| g.clear());
}
