//! Gradient storage container.

use super::graph::NodeId;
use crate::error::TensorError;
use crate::operations::add;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use std::collections::HashMap;
use std::ops::Add;

/// Container for accumulated gradients.
///
/// Stores gradients keyed by NodeId, summing contributions for nodes with
/// multiple downstream paths.
#[derive(Debug)]
pub struct Gradients<T: Scalar> {
    grads: HashMap<NodeId, DenseTensor<T>>,
}

impl<T: Scalar + Add<Output = T>> Gradients<T> {
    pub fn new() -> Self {
        Self {
            grads: HashMap::new(),
        }
    }

    /// Accumulate gradient for a node.
    ///
    /// If a gradient already exists, the new one is added element-wise.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if the shapes of the existing and
    /// incoming gradients differ.
    pub fn accumulate(&mut self, id: NodeId, grad: DenseTensor<T>) -> Result<(), TensorError> {
        match self.grads.get_mut(&id) {
            Some(existing) => *existing = add(existing, &grad)?,
            None => {
                self.grads.insert(id, grad);
            }
        }
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&DenseTensor<T>> {
        self.grads.get(&id)
    }

    /// Remove and return gradient (for passing to backward functions).
    pub fn remove(&mut self, id: NodeId) -> Option<DenseTensor<T>> {
        self.grads.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.grads.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.grads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &DenseTensor<T>)> {
        self.grads.iter()
    }
}

impl<T: Scalar + Add<Output = T>> Default for Gradients<T> {
    fn default() -> Self {
        Self::new()
    }
}
