//! `bmm-tensor` - Tensor container with pluggable GEMM backends for batch-matmul.
//!
//! This crate provides:
//! - A `Tensor` type that exclusively owns row-major f32 or f16 storage
//! - A `ComputeBackend` trait exposing dense GEMM primitives (single,
//!   strided-batched, offset-batched)
//! - A reference `CpuBackend` implementation
//! - A many-core `ParallelBackend` (feature `parallel`)
//! - Shape utilities and broadcasting

pub mod backend;
pub mod cpu;
pub mod dtype;
pub mod error;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod shape;
pub mod storage;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use backend::{ComputeBackend, Transpose};
pub use cpu::CpuBackend;
pub use dtype::DType;
pub use error::{Result, TensorError};
#[cfg(feature = "parallel")]
pub use parallel::{ParallelBackend, ParallelConfig};
pub use shape::Shape;
pub use storage::CpuStorage;
pub use tensor::Tensor;

// Re-exported so callers can build f16 tensors without naming `half` directly.
pub use half::f16;
