use half::f16;

use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A dense, row-major tensor that exclusively owns its storage.
///
/// The storage length always equals `shape.numel()`. Computation is not
/// performed here; operators read and write the typed slices and hand them
/// to a `ComputeBackend`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    storage: CpuStorage,
    shape: Shape,
}

impl Tensor {
    /// Create a new tensor from f32 data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {:?} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_f32_vec(data),
            shape,
        }
    }

    /// Create a new tensor from storage and a shape.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the storage length does not match the shape.
    pub fn from_storage(storage: CpuStorage, shape: Shape) -> Result<Self> {
        if storage.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                got: vec![storage.len()],
            });
        }
        Ok(Tensor { storage, shape })
    }

    /// Create a half-precision tensor from f16 data and a shape.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the data length does not match the shape.
    pub fn from_f16(data: Vec<f16>, shape: Shape) -> Result<Self> {
        Tensor::from_storage(CpuStorage::from_f16_vec(data), shape)
    }

    /// Create a zero-filled f32 tensor with the given shape.
    pub fn zeros(shape: Shape) -> Self {
        Tensor::zeros_typed(shape, DType::F32)
    }

    /// Create a zero-filled tensor with the given shape and dtype.
    pub fn zeros_typed(shape: Shape, dtype: DType) -> Self {
        Tensor {
            storage: CpuStorage::zeros(dtype, shape.numel()),
            shape,
        }
    }

    /// Create an f32 tensor filled with ones with the given shape.
    pub fn ones(shape: Shape) -> Self {
        Tensor::full(shape, 1.0)
    }

    /// Create an f32 tensor with every element set to `value`.
    pub fn full(shape: Shape, value: f32) -> Self {
        Tensor::full_typed(shape, DType::F32, value)
    }

    /// Create a tensor of the given dtype with every element set to `value`.
    pub fn full_typed(shape: Shape, dtype: DType, value: f32) -> Self {
        Tensor {
            storage: CpuStorage::full(dtype, shape.numel(), value),
            shape,
        }
    }

    /// An empty f32 tensor of shape `[0]`, the usual starting point for an
    /// output that an operator will resize.
    pub fn empty() -> Self {
        Tensor::zeros(Shape::new(vec![0]))
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the dimension sizes.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Returns the underlying data as an f32 slice.
    pub fn data_f32(&self) -> Result<&[f32]> {
        self.storage.as_f32_slice()
    }

    /// Returns the underlying data as a mutable f32 slice.
    pub fn data_f32_mut(&mut self) -> Result<&mut [f32]> {
        self.storage.as_f32_slice_mut()
    }

    /// Returns the underlying data as an f16 slice.
    pub fn data_f16(&self) -> Result<&[f16]> {
        self.storage.as_f16_slice()
    }

    /// Returns the underlying data as a mutable f16 slice.
    pub fn data_f16_mut(&mut self) -> Result<&mut [f16]> {
        self.storage.as_f16_slice_mut()
    }

    /// Copies the elements out as f32, widening half-precision data.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.storage.to_f32_vec()
    }

    /// Change the shape in place, keeping the dtype.
    ///
    /// The buffer is reused when the element count is unchanged and
    /// reallocated otherwise. Contents are not preserved across a dims change.
    pub fn resize(&mut self, shape: Shape) {
        let dtype = self.dtype();
        self.resize_as(shape, dtype);
    }

    /// Change the shape and dtype in place.
    ///
    /// Like [`Tensor::resize`], the existing buffer is only reused when both
    /// the element count and dtype are unchanged.
    pub fn resize_as(&mut self, shape: Shape, dtype: DType) {
        if self.storage.len() != shape.numel() || self.storage.dtype() != dtype {
            self.storage = CpuStorage::zeros(dtype, shape.numel());
        }
        self.shape = shape;
    }

    /// Reshape the tensor, returning a new tensor with the same data but
    /// a different shape.
    ///
    /// The total number of elements must remain the same.
    pub fn reshape(&self, new_shape: Shape) -> Result<Tensor> {
        if self.shape.numel() != new_shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.dims().to_vec(),
                got: new_shape.dims().to_vec(),
            });
        }
        Ok(Tensor {
            storage: self.storage.clone(),
            shape: new_shape,
        })
    }

    /// Returns the underlying storage reference.
    pub fn storage(&self) -> &CpuStorage {
        &self.storage
    }
}
