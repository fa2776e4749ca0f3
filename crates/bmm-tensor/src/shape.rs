use crate::error::{Result, TensorError};
use std::fmt;

/// A tensor shape, wrapping a vector of dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The leading dimensions of a matrix-batch shape, i.e. everything but
    /// the trailing two. Empty for rank <= 2.
    pub fn batch_dims(&self) -> &[usize] {
        &self.dims[..self.dims.len().saturating_sub(2)]
    }

    /// The trailing `(rows, cols)` pair, or `None` for rank < 2.
    pub fn matrix_dims(&self) -> Option<(usize, usize)> {
        match self.dims.len() {
            n if n >= 2 => Some((self.dims[n - 2], self.dims[n - 1])),
            _ => None,
        }
    }

    /// Returns a new shape with `tail` appended to these dimensions.
    pub fn extended(&self, tail: &[usize]) -> Shape {
        let mut dims = Vec::with_capacity(self.dims.len() + tail.len());
        dims.extend_from_slice(&self.dims);
        dims.extend_from_slice(tail);
        Shape::new(dims)
    }

    /// Computes row-major contiguous strides for this shape.
    ///
    /// For a shape [d0, d1, d2], the strides are [d1*d2, d2, 1].
    pub fn strides(&self) -> Vec<usize> {
        if self.dims.is_empty() {
            return vec![];
        }
        let mut strides = vec![0usize; self.dims.len()];
        strides[self.dims.len() - 1] = 1;
        for i in (0..self.dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Strides for reading this shape as if it were broadcast to `target`.
    ///
    /// The result has `target.ndim()` entries. Positions where this shape is
    /// absent (left padding) or has size 1 get stride 0, so every index along
    /// them maps back to element 0.
    ///
    /// # Errors
    /// Returns `BroadcastError` if this shape does not broadcast to `target`.
    pub fn broadcast_strides(&self, target: &Shape) -> Result<Vec<usize>> {
        if self.ndim() > target.ndim() {
            return Err(TensorError::BroadcastError {
                a: self.dims.clone(),
                b: target.dims.clone(),
            });
        }
        let offset = target.ndim() - self.ndim();
        let own = self.strides();
        let mut result = vec![0usize; target.ndim()];
        for (i, &d) in self.dims.iter().enumerate() {
            let t = target.dims[offset + i];
            if d == t && d != 1 {
                result[offset + i] = own[i];
            } else if d != 1 {
                return Err(TensorError::BroadcastError {
                    a: self.dims.clone(),
                    b: target.dims.clone(),
                });
            }
        }
        Ok(result)
    }

    /// Compute the broadcast shape of `a` and `b` using numpy-style broadcasting rules.
    ///
    /// Rules:
    /// 1. If the shapes have different numbers of dimensions, the shorter shape is
    ///    padded with ones on the left.
    /// 2. For each dimension, sizes must either be equal, or one of them must be 1.
    ///    The output dimension is the one that is not 1.
    pub fn broadcast_shape(a: &Shape, b: &Shape) -> Result<Shape> {
        let max_ndim = a.ndim().max(b.ndim());
        let mut result = Vec::with_capacity(max_ndim);

        for i in 0..max_ndim {
            // Index from the right: dim at position (ndim - 1 - i) from the right
            let da = if i < a.ndim() {
                a.dims[a.ndim() - 1 - i]
            } else {
                1
            };
            let db = if i < b.ndim() {
                b.dims[b.ndim() - 1 - i]
            } else {
                1
            };

            if da == db {
                result.push(da);
            } else if da == 1 {
                result.push(db);
            } else if db == 1 {
                result.push(da);
            } else {
                return Err(TensorError::BroadcastError {
                    a: a.dims.clone(),
                    b: b.dims.clone(),
                });
            }
        }

        result.reverse();
        Ok(Shape::new(result))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}
