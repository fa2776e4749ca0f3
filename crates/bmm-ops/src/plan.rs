//! Shape resolution for batched matrix multiplication.
//!
//! A [`MatMulPlan`] is everything an invocation needs before touching data:
//! the resolved batch shape, the post-transpose matrix sizes and, for each
//! output batch element in row-major order, the element offsets of the A and
//! B matrices it reads. Broadcast replication is expressed purely through
//! these offsets.

use bmm_tensor::{Shape, TensorError, Transpose};

use crate::batch_matmul::{INPUT_A, INPUT_B};
use crate::config::BatchMatMulConfig;

/// How the plan maps onto backend GEMM primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The output has no elements; nothing to submit.
    Empty,
    /// Source matrices advance by a fixed stride per batch element
    /// (0 for an operand replicated across the whole batch).
    Strided { a_stride: usize, b_stride: usize },
    /// Source matrices need explicit per-element offsets.
    Offsets,
}

/// Validated shapes and source offsets for one batch matmul invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatMulPlan {
    batch_shape: Shape,
    m: usize,
    n: usize,
    k: usize,
    trans_a: Transpose,
    trans_b: Transpose,
    a_offsets: Vec<usize>,
    b_offsets: Vec<usize>,
}

impl MatMulPlan {
    /// Resolve and validate the shapes of A and B under `config`.
    ///
    /// # Errors
    /// - `RankTooLow` if either input has fewer than 2 dims
    /// - `BatchShapeMismatch` if broadcasting is off and the batch shapes differ
    /// - `BroadcastError` if broadcasting is on and the batch shapes are incompatible
    /// - `MatmulMismatch` if op(A).cols != op(B).rows
    pub fn new(a: &Shape, b: &Shape, config: &BatchMatMulConfig) -> Result<Self, TensorError> {
        let (a_rows, a_cols) = a.matrix_dims().ok_or(TensorError::RankTooLow {
            input: INPUT_A,
            ndim: a.ndim(),
        })?;
        let (b_rows, b_cols) = b.matrix_dims().ok_or(TensorError::RankTooLow {
            input: INPUT_B,
            ndim: b.ndim(),
        })?;

        let a_batch = Shape::from_slice(a.batch_dims());
        let b_batch = Shape::from_slice(b.batch_dims());
        let batch_shape = if config.broadcast {
            Shape::broadcast_shape(&a_batch, &b_batch)?
        } else if a_batch == b_batch {
            a_batch.clone()
        } else {
            return Err(TensorError::BatchShapeMismatch {
                a: a_batch.dims().to_vec(),
                b: b_batch.dims().to_vec(),
            });
        };

        let (m, k) = if config.trans_a { (a_cols, a_rows) } else { (a_rows, a_cols) };
        let (k2, n) = if config.trans_b { (b_cols, b_rows) } else { (b_rows, b_cols) };
        if k != k2 {
            return Err(TensorError::MatmulMismatch { m, k, k2, n });
        }

        let a_offsets = source_offsets(&a_batch, &batch_shape, a_rows * a_cols)?;
        let b_offsets = source_offsets(&b_batch, &batch_shape, b_rows * b_cols)?;

        Ok(Self {
            batch_shape,
            m,
            n,
            k,
            trans_a: Transpose::from_flag(config.trans_a),
            trans_b: Transpose::from_flag(config.trans_b),
            a_offsets,
            b_offsets,
        })
    }

    /// The resolved batch shape.
    pub fn batch_shape(&self) -> &Shape {
        &self.batch_shape
    }

    /// Shape of Y: resolved batch shape ++ [m, n].
    pub fn output_shape(&self) -> Shape {
        self.batch_shape.extended(&[self.m, self.n])
    }

    /// Number of matrices in the output batch.
    pub fn batch_size(&self) -> usize {
        self.batch_shape.numel()
    }

    /// Rows of op(A) and of Y's matrices.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Columns of op(B) and of Y's matrices.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Contraction dimension.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn trans_a(&self) -> Transpose {
        self.trans_a
    }

    pub fn trans_b(&self) -> Transpose {
        self.trans_b
    }

    /// Element offset into A of the matrix read by each output batch element.
    pub fn a_offsets(&self) -> &[usize] {
        &self.a_offsets
    }

    /// Element offset into B of the matrix read by each output batch element.
    pub fn b_offsets(&self) -> &[usize] {
        &self.b_offsets
    }

    /// Choose the backend primitive that reproduces the per-element loop.
    pub fn dispatch(&self) -> Dispatch {
        if self.batch_size() == 0 || self.m * self.n == 0 {
            return Dispatch::Empty;
        }
        match (uniform_stride(&self.a_offsets), uniform_stride(&self.b_offsets)) {
            (Some(a_stride), Some(b_stride)) => Dispatch::Strided { a_stride, b_stride },
            _ => Dispatch::Offsets,
        }
    }
}

/// Offsets (in elements) of the source matrix for every index of `target`,
/// visited in row-major order. Indices along broadcast dims clamp to 0.
fn source_offsets(batch: &Shape, target: &Shape, matrix_len: usize) -> Result<Vec<usize>, TensorError> {
    let strides = batch.broadcast_strides(target)?;
    let dims = target.dims();
    let total = target.numel();
    let mut offsets = Vec::with_capacity(total);
    let mut index = vec![0usize; dims.len()];
    let mut offset = 0usize;

    for _ in 0..total {
        offsets.push(offset * matrix_len);
        // odometer increment, last dim fastest
        for d in (0..dims.len()).rev() {
            index[d] += 1;
            offset += strides[d];
            if index[d] < dims[d] {
                break;
            }
            offset -= strides[d] * index[d];
            index[d] = 0;
        }
    }
    Ok(offsets)
}

/// Returns `s` if `offsets[i] == i * s` for every `i`.
fn uniform_stride(offsets: &[usize]) -> Option<usize> {
    let stride = match offsets {
        [] | [_] => 0,
        [first, second, ..] => second.checked_sub(*first)?,
    };
    offsets
        .iter()
        .enumerate()
        .all(|(i, &o)| o == i * stride)
        .then_some(stride)
}
