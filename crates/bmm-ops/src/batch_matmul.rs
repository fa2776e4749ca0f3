use bmm_tensor::{f16, ComputeBackend, DType, Shape, Tensor, TensorError};
use tracing::debug;

use crate::args::OperatorArgs;
use crate::config::BatchMatMulConfig;
use crate::error::Result;
use crate::plan::{Dispatch, MatMulPlan};

/// Input slot names.
pub const INPUT_A: &str = "A";
pub const INPUT_B: &str = "B";
/// Output slot name.
pub const OUTPUT_Y: &str = "Y";

/// Static cost estimate of one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCost {
    /// Multiply-adds counted as two flops.
    pub flops: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// The operator has no parameters; kept for parity with other cost reports.
    pub params_bytes: u64,
}

/// Batched matrix multiplication: `Y[i] = op(A)[ia] @ op(B)[ib]` for every
/// index `i` of the resolved batch shape.
///
/// The last two dims of each input are the matrix dims and the leading dims
/// are batch dims. With `broadcast` off the batch shapes must be identical;
/// with it on they broadcast numpy-style, replicating size-1 and missing
/// leading dims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchMatMul {
    config: BatchMatMulConfig,
}

impl BatchMatMul {
    pub fn new(config: BatchMatMulConfig) -> Self {
        Self { config }
    }

    /// Construct from declarative named arguments (`broadcast`, `trans_a`,
    /// `trans_b`).
    pub fn from_args(args: &OperatorArgs) -> Result<Self> {
        Ok(Self::new(BatchMatMulConfig::from_args(args)?))
    }

    pub fn config(&self) -> &BatchMatMulConfig {
        &self.config
    }

    /// Validate the input shapes and resolve the invocation plan.
    pub fn plan(&self, a: &Shape, b: &Shape) -> Result<MatMulPlan> {
        Ok(MatMulPlan::new(a, b, &self.config)?)
    }

    /// Shape of Y for inputs of the given shapes, with the same validation
    /// as [`BatchMatMul::compute`].
    pub fn infer_output_shape(&self, a: &Shape, b: &Shape) -> Result<Shape> {
        Ok(self.plan(a, b)?.output_shape())
    }

    /// Estimate flops and memory traffic for multiplying `a` by `b`.
    pub fn cost(&self, a: &Tensor, b: &Tensor) -> Result<OpCost> {
        let plan = self.plan(a.shape(), b.shape())?;
        let elem = a.dtype().size_in_bytes() as u64;
        let (batch, m, n, k) = (
            plan.batch_size() as u64,
            plan.m() as u64,
            plan.n() as u64,
            plan.k() as u64,
        );
        Ok(OpCost {
            flops: 2 * batch * m * n * k,
            bytes_read: (a.numel() + b.numel()) as u64 * elem,
            bytes_written: batch * m * n * elem,
            params_bytes: 0,
        })
    }

    /// Multiply `a` by `b` into a new tensor.
    ///
    /// Waits for the backend to finish, so the result is ready to read.
    pub fn compute(&self, a: &Tensor, b: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let mut y = Tensor::empty();
        self.compute_into(a, b, &mut y, backend)?;
        backend.synchronize()?;
        Ok(y)
    }

    /// Multiply `a` by `b`, resizing `y` to the output shape and writing it.
    ///
    /// All validation happens before any work is submitted, so on error `y`
    /// is untouched. For f32 inputs the caller must `synchronize` the backend
    /// before reading `y`.
    pub fn compute_into(
        &self,
        a: &Tensor,
        b: &Tensor,
        y: &mut Tensor,
        backend: &dyn ComputeBackend,
    ) -> Result<()> {
        let plan = self.plan(a.shape(), b.shape())?;
        if a.dtype() != b.dtype() {
            return Err(TensorError::DTypeMismatch {
                expected: a.dtype().to_string(),
                got: b.dtype().to_string(),
            }
            .into());
        }

        let dispatch = plan.dispatch();
        debug!(
            a = %a.shape(),
            b = %b.shape(),
            y = %plan.output_shape(),
            dtype = %a.dtype(),
            ?dispatch,
            backend = backend.name(),
            "batch matmul"
        );

        y.resize_as(plan.output_shape(), a.dtype());
        match a.dtype() {
            DType::F32 => run(&plan, dispatch, a.data_f32()?, b.data_f32()?, y.data_f32_mut()?, backend),
            DType::F16 => {
                let mut out = vec![0.0f32; y.numel()];
                run(&plan, dispatch, &a.to_f32_vec(), &b.to_f32_vec(), &mut out, backend)?;
                backend.synchronize()?;
                for (dst, src) in y.data_f16_mut()?.iter_mut().zip(out) {
                    *dst = f16::from_f32(src);
                }
                Ok(())
            }
        }
    }
}

/// Submit the GEMM work for `plan`.
fn run(
    plan: &MatMulPlan,
    dispatch: Dispatch,
    a: &[f32],
    b: &[f32],
    y: &mut [f32],
    backend: &dyn ComputeBackend,
) -> Result<()> {
    let (m, n, k) = (plan.m(), plan.n(), plan.k());
    match dispatch {
        Dispatch::Empty => {}
        Dispatch::Strided { a_stride, b_stride } => backend.gemm_strided_batched(
            plan.trans_a(),
            plan.trans_b(),
            plan.batch_size(),
            m,
            n,
            k,
            a,
            a_stride,
            b,
            b_stride,
            y,
        )?,
        Dispatch::Offsets => backend.gemm_batched(
            plan.trans_a(),
            plan.trans_b(),
            m,
            n,
            k,
            a,
            plan.a_offsets(),
            b,
            plan.b_offsets(),
            y,
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bmm_tensor::CpuBackend;

    fn seq(dims: &[usize]) -> Tensor {
        let shape = Shape::from_slice(dims);
        let data = (0..shape.numel()).map(|v| (v % 7) as f32 - 3.0).collect();
        Tensor::new(data, shape)
    }

    #[test]
    fn test_ones_strict() {
        let op = BatchMatMul::default();
        let a = Tensor::ones(Shape::new(vec![3, 5, 10]));
        let b = Tensor::ones(Shape::new(vec![3, 10, 6]));
        let y = op.compute(&a, &b, &CpuBackend::new()).unwrap();
        assert_eq!(y.dims(), &[3, 5, 6]);
        assert!(y.data_f32().unwrap().iter().all(|&v| v == 10.0));
    }

    #[test]
    fn test_single_matrix_values() {
        let op = BatchMatMul::default();
        let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]));
        let b = Tensor::new(vec![5.0, 6.0, 7.0, 8.0], Shape::new(vec![2, 2]));
        let y = op.compute(&a, &b, &CpuBackend::new()).unwrap();
        assert_eq!(y.data_f32().unwrap(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_transpose_matches_materialized() {
        // A^T stored as [2, 3, 2] read as [2, 2, 3]
        let a_t = seq(&[2, 3, 2]);
        let mut a_data = vec![0.0; 12];
        let src = a_t.data_f32().unwrap();
        for bi in 0..2 {
            for r in 0..3 {
                for c in 0..2 {
                    a_data[bi * 6 + c * 3 + r] = src[bi * 6 + r * 2 + c];
                }
            }
        }
        let a = Tensor::new(a_data, Shape::new(vec![2, 2, 3]));
        let b = seq(&[2, 3, 4]);

        let backend = CpuBackend::new();
        let expected = BatchMatMul::default().compute(&a, &b, &backend).unwrap();
        let op = BatchMatMul::new(BatchMatMulConfig::new().with_trans_a(true));
        let y = op.compute(&a_t, &b, &backend).unwrap();
        assert_eq!(y, expected);
    }

    #[test]
    fn test_compute_into_error_leaves_output() {
        let op = BatchMatMul::default();
        let mut y = Tensor::ones(Shape::new(vec![2]));
        let r = op.compute_into(
            &Tensor::ones(Shape::new(vec![3, 5, 10])),
            &Tensor::ones(Shape::new(vec![2, 10, 6])),
            &mut y,
            &CpuBackend::new(),
        );
        assert!(r.unwrap_err().is_shape_error());
        assert_eq!(y, Tensor::ones(Shape::new(vec![2])));
    }

    #[test]
    fn test_dtype_mismatch() {
        let op = BatchMatMul::default();
        let a = Tensor::ones(Shape::new(vec![2, 2]));
        let b = Tensor::full_typed(Shape::new(vec![2, 2]), DType::F16, 1.0);
        let e = op.compute(&a, &b, &CpuBackend::new()).unwrap_err();
        assert!(!e.is_shape_error());
    }

    #[test]
    fn test_f16_inputs() {
        let op = BatchMatMul::new(BatchMatMulConfig::new().with_broadcast(true));
        let a = Tensor::full_typed(Shape::new(vec![1, 2, 4]), DType::F16, 0.5);
        let b = Tensor::full_typed(Shape::new(vec![3, 4, 2]), DType::F16, 2.0);
        let y = op.compute(&a, &b, &CpuBackend::new()).unwrap();
        assert_eq!(y.dtype(), DType::F16);
        assert_eq!(y.dims(), &[3, 2, 2]);
        for v in y.to_f32_vec() {
            assert_relative_eq!(v, 4.0);
        }
    }

    #[test]
    fn test_zero_contraction_gives_zeros() {
        let op = BatchMatMul::default();
        let a = Tensor::zeros(Shape::new(vec![2, 3, 0]));
        let b = Tensor::zeros(Shape::new(vec![2, 0, 4]));
        let mut y = Tensor::full(Shape::new(vec![2, 3, 4]), 9.0);
        op.compute_into(&a, &b, &mut y, &CpuBackend::new()).unwrap();
        assert_eq!(y.dims(), &[2, 3, 4]);
        assert!(y.data_f32().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_output() {
        let op = BatchMatMul::default();
        let y = op
            .compute(
                &Tensor::zeros(Shape::new(vec![0, 3, 2])),
                &Tensor::zeros(Shape::new(vec![0, 2, 4])),
                &CpuBackend::new(),
            )
            .unwrap();
        assert_eq!(y.dims(), &[0, 3, 4]);
        assert_eq!(y.numel(), 0);
    }

    #[test]
    fn test_infer_output_shape() {
        let op = BatchMatMul::new(BatchMatMulConfig::new().with_broadcast(true).with_trans_b(true));
        let s = op
            .infer_output_shape(&Shape::new(vec![3, 5, 10]), &Shape::new(vec![2, 1, 6, 10]))
            .unwrap();
        assert_eq!(s.dims(), &[2, 3, 5, 6]);
    }

    #[test]
    fn test_cost() {
        let op = BatchMatMul::new(BatchMatMulConfig::new().with_broadcast(true));
        let a = Tensor::ones(Shape::new(vec![3, 5, 10]));
        let b = Tensor::ones(Shape::new(vec![2, 3, 10, 6]));
        let cost = op.cost(&a, &b).unwrap();
        assert_eq!(cost.flops, 2 * 6 * 5 * 6 * 10);
        assert_eq!(cost.bytes_read, (150 + 360) * 4);
        assert_eq!(cost.bytes_written, 180 * 4);
        assert_eq!(cost.params_bytes, 0);
    }

    #[test]
    fn test_from_args() {
        let op = BatchMatMul::from_args(&OperatorArgs::new().with("broadcast", 1i64)).unwrap();
        assert!(op.config().broadcast);
    }
}
