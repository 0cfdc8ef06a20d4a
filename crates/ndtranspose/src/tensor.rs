//! Column-major dense tensor.
//!
//! A tensor owns a flat element vector plus its shape and strides. Axis
//! permutation always produces a new tensor with freshly computed strides.

use crate::error::TensorError;
use crate::permutation::AxisPermutation;
use crate::scalar::Scalar;
use crate::strides::{cartesian_to_linear, compute_strides, shape_len};

/// An n-dimensional tensor stored in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<ElT: Scalar> {
    data: Vec<ElT>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

/// The tensor type operators consume and produce.
pub type DenseTensor<ElT> = Tensor<ElT>;

impl<ElT: Scalar> Tensor<ElT> {
    /// Create a new tensor with the given shape, zero-initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndtranspose::Tensor;
    ///
    /// let t: Tensor<f32> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: vec![ElT::zero(); shape_len(shape)],
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        }
    }

    /// Create a tensor from column-major data and a shape.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::DataLengthMismatch` if the data length doesn't
    /// match the shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndtranspose::{DenseTensor, Tensor};
    ///
    /// let t: DenseTensor<f64> = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get(&[1, 0]), Some(&2.0)); // column-major: [1,0] is the second element
    /// assert_eq!(t.get(&[0, 1]), Some(&3.0));
    /// ```
    pub fn from_vec(data: Vec<ElT>, shape: &[usize]) -> Result<Self, TensorError> {
        let expected = shape_len(shape);
        if data.len() != expected {
            return Err(TensorError::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        })
    }

    /// Create a tensor filled with ones; the usual seed for a backward pass.
    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: vec![ElT::one(); shape_len(shape)],
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Rank (number of axes).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if some axis has zero extent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Elements in column-major order.
    #[inline]
    pub fn data(&self) -> &[ElT] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [ElT] {
        &mut self.data
    }

    /// Get element by cartesian indices.
    ///
    /// Returns `None` if indices are out of bounds or the wrong number of
    /// indices is given.
    pub fn get(&self, indices: &[usize]) -> Option<&ElT> {
        self.linear_index(indices).ok().and_then(|i| self.data.get(i))
    }

    /// Set element by cartesian indices.
    ///
    /// # Errors
    ///
    /// Returns error if indices are out of bounds or the wrong number of
    /// indices is given.
    pub fn set(&mut self, indices: &[usize], value: ElT) -> Result<(), TensorError> {
        let linear = self.linear_index(indices)?;
        self.data[linear] = value;
        Ok(())
    }

    fn linear_index(&self, indices: &[usize]) -> Result<usize, TensorError> {
        if indices.len() != self.ndim() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }
        for (&index, &dim_size) in indices.iter().zip(&self.shape) {
            if index >= dim_size {
                return Err(TensorError::IndexOutOfBounds { index, dim_size });
            }
        }
        Ok(cartesian_to_linear(indices, &self.strides))
    }

    /// Permute the dimensions of the tensor.
    ///
    /// `perm[i]` gives the source dimension for the i-th dimension of the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns error if `perm` is not a valid permutation of `0..ndim`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndtranspose::DenseTensor;
    ///
    /// let t = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let t2 = t.permutedims(&[1, 0]).unwrap();
    /// assert_eq!(t2.shape(), &[3, 2]);
    /// assert_eq!(t.get(&[0, 2]), t2.get(&[2, 0]));
    /// ```
    pub fn permutedims(&self, perm: &[usize]) -> Result<Self, TensorError> {
        crate::operations::permutedims(self, perm)
    }

    /// Reverse the order of all dimensions.
    ///
    /// For a matrix this is the ordinary transpose.
    pub fn reverse_dims(&self) -> Self {
        crate::operations::reverse_dims(self)
    }

    /// Apply an [`AxisPermutation`], either explicit or reverse-all.
    pub fn permute(&self, perm: &AxisPermutation) -> Result<Self, TensorError> {
        crate::operations::transpose_with(self, perm)
    }
}
