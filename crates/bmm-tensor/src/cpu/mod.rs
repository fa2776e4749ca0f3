pub(crate) mod gemm;

use tracing::trace;

use crate::backend::{check_gemm, ComputeBackend, Transpose};
use crate::error::Result;

/// Pure-Rust CPU compute backend.
///
/// Runs every GEMM on the calling thread with straightforward loops
/// optimized for correctness rather than peak performance. Intended as a
/// reference implementation and fallback.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

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
    ) -> Result<()> {
        check_gemm(m, n, k, a, b, c)?;
        trace!(m, n, k, ?trans_a, ?trans_b, "cpu gemm");
        gemm::gemm_f32(trans_a, trans_b, m, n, k, a, b, c);
        Ok(())
    }
}
