// Many-core compute backend built on a dedicated rayon thread pool.
//
// Batch elements are independent, so batched GEMMs fan out one task per
// output matrix. A single GEMM is split by output rows. Every element still
// runs the reference kernel, so results match `CpuBackend` bit for bit.

use std::thread;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::backend::{check_batched, check_gemm, ComputeBackend, Transpose};
use crate::cpu::gemm::gemm_f32_rows;
use crate::error::{Result, TensorError};

/// Configuration for [`ParallelBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Worker threads; 0 means one per available hardware thread.
    pub num_threads: usize,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            thread_name_prefix: "bmm-worker".to_string(),
        }
    }
}

/// Many-core backend that executes GEMM work on its own thread pool.
#[derive(Debug)]
pub struct ParallelBackend {
    pool: rayon::ThreadPool,
    config: ParallelConfig,
}

impl ParallelBackend {
    /// Probe for a many-core device and create a backend with default
    /// configuration.
    ///
    /// Returns `None` when fewer than two hardware threads are available or
    /// the pool cannot be started, so callers can fall back to `CpuBackend`.
    pub fn new() -> Option<Self> {
        let available = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        if available < 2 {
            debug!(available, "parallel backend unavailable");
            return None;
        }
        Self::with_config(ParallelConfig::default()).ok()
    }

    /// Create a backend with an explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the thread pool cannot be built.
    pub fn with_config(config: ParallelConfig) -> Result<Self> {
        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(move |idx| format!("{prefix}-{idx}"))
            .build()
            .map_err(|e| TensorError::Other(format!("failed to start thread pool: {e}")))?;
        debug!(threads = pool.current_num_threads(), "parallel backend ready");
        Ok(Self { pool, config })
    }

    /// The configuration this backend was created with.
    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Number of worker threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ComputeBackend for ParallelBackend {
    fn name(&self) -> &str {
        "parallel"
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
        if m * n == 0 {
            return Ok(());
        }
        trace!(m, n, k, "parallel gemm");
        self.pool.install(|| {
            c.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
                gemm_f32_rows(trans_a, trans_b, m, n, k, a, b, i, row);
            });
        });
        Ok(())
    }

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
        trace!(batch = a_offsets.len(), m, n, k, "parallel gemm_batched");
        self.pool.install(|| {
            c.par_chunks_mut(m * n).enumerate().for_each(|(i, c_i)| {
                let a_i = &a[a_offsets[i]..a_offsets[i] + m * k];
                let b_i = &b[b_offsets[i]..b_offsets[i] + k * n];
                gemm_f32_rows(trans_a, trans_b, m, n, k, a_i, b_i, 0, c_i);
            });
        });
        Ok(())
    }

    fn set(&self, value: f32, out: &mut [f32]) -> Result<()> {
        self.pool.install(|| out.par_iter_mut().for_each(|x| *x = value));
        Ok(())
    }
}
