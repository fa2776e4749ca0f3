use std::fmt::Debug;

use crate::error::{Result, TensorError};

/// Whether a GEMM operand is read as stored or as its transpose.
///
/// Operands are always row-major. A transposed `[m, k]` operand is stored as
/// `[k, m]`; no memory is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transpose {
    #[default]
    No,
    Yes,
}

impl Transpose {
    pub fn from_flag(transposed: bool) -> Self {
        if transposed {
            Transpose::Yes
        } else {
            Transpose::No
        }
    }

    pub fn is_transposed(self) -> bool {
        self == Transpose::Yes
    }
}

/// Trait for pluggable compute backends (CPU reference, many-core, etc.).
///
/// Data is passed in as row-major f32 slices and results are written into a
/// caller-owned output slice. Backends may complete work before returning or
/// queue it; `synchronize` is the barrier callers use before reading outputs.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu", "parallel").
    fn name(&self) -> &str;

    /// Dense matrix multiply: C = op(A) @ op(B).
    ///
    /// - `a`: op(A) is [m, k]; stored [m, k], or [k, m] when transposed
    /// - `b`: op(B) is [k, n]; stored [k, n], or [n, k] when transposed
    /// - `c`: output of shape [m, n], fully overwritten
    #[allow(clippy::too_many_arguments)]
    fn gemm(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        a: &[f32],
        b: &[f32],
        c: &mut [f32],
    ) -> Result<()>;

    /// Batched GEMM where element `i` reads A at `a_offsets[i]` and B at
    /// `b_offsets[i]`, and writes the `i`-th [m, n] block of `c`.
    ///
    /// The batch size is `a_offsets.len()`. Elements are independent; no
    /// ordering between them is guaranteed.
    #[allow(clippy::too_many_arguments)]
    fn gemm_batched(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        a: &[f32],
        a_offsets: &[usize],
        b: &[f32],
        b_offsets: &[usize],
        c: &mut [f32],
    ) -> Result<()> {
        check_batched(m, n, k, a, a_offsets, b, b_offsets, c)?;
        if m * n == 0 {
            return Ok(());
        }
        for (i, c_i) in c.chunks_mut(m * n).enumerate() {
            let a_i = &a[a_offsets[i]..a_offsets[i] + m * k];
            let b_i = &b[b_offsets[i]..b_offsets[i] + k * n];
            self.gemm(trans_a, trans_b, m, n, k, a_i, b_i, c_i)?;
        }
        Ok(())
    }

    /// Batched GEMM with uniform strides between consecutive operands.
    /// A stride of 0 replicates a single matrix across the batch.
    #[allow(clippy::too_many_arguments)]
    fn gemm_strided_batched(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        batch: usize,
        m: usize,
        n: usize,
        k: usize,
        a: &[f32],
        a_stride: usize,
        b: &[f32],
        b_stride: usize,
        c: &mut [f32],
    ) -> Result<()> {
        let a_offsets: Vec<usize> = (0..batch).map(|i| i * a_stride).collect();
        let b_offsets: Vec<usize> = (0..batch).map(|i| i * b_stride).collect();
        self.gemm_batched(trans_a, trans_b, m, n, k, a, &a_offsets, b, &b_offsets, c)
    }

    /// Fill `out` with `value`.
    fn set(&self, value: f32, out: &mut [f32]) -> Result<()> {
        out.fill(value);
        Ok(())
    }

    /// Block until all submitted work has completed.
    fn synchronize(&self) -> Result<()> {
        Ok(())
    }
}

/// Validates the buffer lengths of a single GEMM call.
pub(crate) fn check_gemm(m: usize, n: usize, k: usize, a: &[f32], b: &[f32], c: &[f32]) -> Result<()> {
    if a.len() != m * k {
        return Err(TensorError::Other(format!(
            "gemm: a.len()={} but expected m*k={}",
            a.len(),
            m * k
        )));
    }
    if b.len() != k * n {
        return Err(TensorError::Other(format!(
            "gemm: b.len()={} but expected k*n={}",
            b.len(),
            k * n
        )));
    }
    if c.len() != m * n {
        return Err(TensorError::Other(format!(
            "gemm: c.len()={} but expected m*n={}",
            c.len(),
            m * n
        )));
    }
    Ok(())
}

/// Validates offsets and buffer lengths of a batched GEMM call.
#[allow(clippy::too_many_arguments)]
pub(crate) fn check_batched(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    a_offsets: &[usize],
    b: &[f32],
    b_offsets: &[usize],
    c: &[f32],
) -> Result<()> {
    let batch = a_offsets.len();
    if b_offsets.len() != batch {
        return Err(TensorError::Other(format!(
            "gemm_batched: {} A offsets but {} B offsets",
            batch,
            b_offsets.len()
        )));
    }
    if c.len() != batch * m * n {
        return Err(TensorError::Other(format!(
            "gemm_batched: c.len()={} but expected batch*m*n={}",
            c.len(),
            batch * m * n
        )));
    }
    if let Some(&bad) = a_offsets.iter().find(|&&o| o + m * k > a.len()) {
        return Err(TensorError::Other(format!(
            "gemm_batched: A offset {} out of bounds for a.len()={}",
            bad,
            a.len()
        )));
    }
    if let Some(&bad) = b_offsets.iter().find(|&&o| o + k * n > b.len()) {
        return Err(TensorError::Other(format!(
            "gemm_batched: B offset {} out of bounds for b.len()={}",
            bad,
            b.len()
        )));
    }
    Ok(())
}
