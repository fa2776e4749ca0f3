use half::f16;

use crate::dtype::DType;
use crate::error::{Result, TensorError};

/// Host-side tensor storage, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum CpuStorage {
    /// 32-bit floating point storage.
    F32(Vec<f32>),
    /// 16-bit floating point storage.
    F16(Vec<f16>),
}

impl CpuStorage {
    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        match self {
            CpuStorage::F32(v) => v.len(),
            CpuStorage::F16(v) => v.len(),
        }
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the data as an f32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32.
    pub fn as_f32_slice(&self) -> Result<&[f32]> {
        match self {
            CpuStorage::F32(v) => Ok(v.as_slice()),
            other => Err(dtype_mismatch(DType::F32, other.dtype())),
        }
    }

    /// Returns the data as a mutable f32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32.
    pub fn as_f32_slice_mut(&mut self) -> Result<&mut [f32]> {
        match self {
            CpuStorage::F32(v) => Ok(v.as_mut_slice()),
            other => Err(dtype_mismatch(DType::F32, other.dtype())),
        }
    }

    /// Returns the data as an f16 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F16.
    pub fn as_f16_slice(&self) -> Result<&[f16]> {
        match self {
            CpuStorage::F16(v) => Ok(v.as_slice()),
            other => Err(dtype_mismatch(DType::F16, other.dtype())),
        }
    }

    /// Returns the data as a mutable f16 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F16.
    pub fn as_f16_slice_mut(&mut self) -> Result<&mut [f16]> {
        match self {
            CpuStorage::F16(v) => Ok(v.as_mut_slice()),
            other => Err(dtype_mismatch(DType::F16, other.dtype())),
        }
    }

    /// Copies the elements out as f32, widening half-precision values.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            CpuStorage::F32(v) => v.clone(),
            CpuStorage::F16(v) => v.iter().map(|x| x.to_f32()).collect(),
        }
    }

    /// Create zero-filled storage for the given dtype and element count.
    pub fn zeros(dtype: DType, n: usize) -> Self {
        match dtype {
            DType::F32 => CpuStorage::F32(vec![0.0; n]),
            DType::F16 => CpuStorage::F16(vec![f16::ZERO; n]),
        }
    }

    /// Create storage of `n` elements all equal to `value`.
    pub fn full(dtype: DType, n: usize, value: f32) -> Self {
        match dtype {
            DType::F32 => CpuStorage::F32(vec![value; n]),
            DType::F16 => CpuStorage::F16(vec![f16::from_f32(value); n]),
        }
    }

    /// Create storage from an f32 vector.
    pub fn from_f32_vec(data: Vec<f32>) -> Self {
        CpuStorage::F32(data)
    }

    /// Create storage from an f16 vector.
    pub fn from_f16_vec(data: Vec<f16>) -> Self {
        CpuStorage::F16(data)
    }

    /// Returns the dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            CpuStorage::F32(_) => DType::F32,
            CpuStorage::F16(_) => DType::F16,
        }
    }
}

fn dtype_mismatch(expected: DType, got: DType) -> TensorError {
    TensorError::DTypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f32_vec() {
        let s = CpuStorage::from_f32_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(s.as_f32_slice().unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zeros() {
        let s = CpuStorage::zeros(DType::F32, 5);
        assert_eq!(s.len(), 5);
        assert_eq!(s.as_f32_slice().unwrap(), &[0.0; 5]);

        let h = CpuStorage::zeros(DType::F16, 3);
        assert_eq!(h.dtype(), DType::F16);
        assert_eq!(h.to_f32_vec(), vec![0.0; 3]);
    }

    #[test]
    fn test_full_f16_widens() {
        let h = CpuStorage::full(DType::F16, 4, 1.5);
        assert_eq!(h.to_f32_vec(), vec![1.5; 4]);
    }

    #[test]
    fn test_wrong_dtype_access() {
        let s = CpuStorage::from_f32_vec(vec![1.0]);
        assert!(matches!(
            s.as_f16_slice(),
            Err(TensorError::DTypeMismatch { .. })
        ));
        let h = CpuStorage::from_f16_vec(vec![f16::ONE]);
        assert!(h.as_f32_slice().is_err());
    }

    #[test]
    fn test_mut_slice() {
        let mut s = CpuStorage::from_f32_vec(vec![1.0, 2.0]);
        let slice = s.as_f32_slice_mut().unwrap();
        slice[0] = 42.0;
        assert_eq!(s.as_f32_slice().unwrap()[0], 42.0);
    }
}
