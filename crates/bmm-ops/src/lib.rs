//! `bmm-ops` - Batched matrix multiplication over `bmm-tensor`.
//!
//! Given A `[..batch_a, m, k]` and B `[..batch_b, k, n]`, `BatchMatMul`
//! resolves the batch shapes (strictly equal, or numpy-style broadcast when
//! enabled), sizes Y as `[..batch, m, n]` and submits one GEMM per output
//! matrix to a `ComputeBackend`, batched where the backend allows.

pub mod args;
pub mod batch_matmul;
pub mod config;
pub mod error;
pub mod plan;

pub use args::{ArgValue, OperatorArgs};
pub use batch_matmul::{BatchMatMul, OpCost, INPUT_A, INPUT_B, OUTPUT_Y};
pub use config::BatchMatMulConfig;
pub use error::{OpError, Result};
pub use plan::{Dispatch, MatMulPlan};

pub use bmm_tensor;
