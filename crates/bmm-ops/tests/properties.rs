//! Property-based tests for batch matmul shape resolution and backends.
//!
//! Key invariants:
//! - Broadcast-compatible batch shapes resolve to the per-position non-1 value
//! - Y's shape is always resolved batch ++ [m, n]
//! - Strict mode accepts only identical batch shapes
//! - Every backend produces the same values as the CPU reference

use bmm_ops::bmm_tensor::{CpuBackend, Shape, Tensor};
use bmm_ops::{BatchMatMul, BatchMatMulConfig};
use proptest::prelude::*;

/// A full batch shape plus a broadcast-compatible partner derived from it by
/// dropping leading dims and collapsing some dims to 1.
fn batch_pair() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec(1usize..4, 0..4).prop_flat_map(|full| {
        let len = full.len();
        (
            Just(full),
            0..=len,
            prop::collection::vec(any::<bool>(), len),
        )
            .prop_map(move |(full, keep, ones)| {
                let partner = full[len - keep..]
                    .iter()
                    .zip(&ones[len - keep..])
                    .map(|(&d, &one)| if one { 1 } else { d })
                    .collect();
                (full, partner)
            })
    })
}

fn filled(dims: Vec<usize>, seed: u32) -> Tensor {
    let shape = Shape::new(dims);
    let data = (0..shape.numel())
        .map(|i| ((i as u32).wrapping_mul(31).wrapping_add(seed) % 17) as f32 * 0.125 - 1.0)
        .collect();
    Tensor::new(data, shape)
}

fn with_matrix(batch: &[usize], rows: usize, cols: usize) -> Vec<usize> {
    let mut dims = batch.to_vec();
    dims.extend([rows, cols]);
    dims
}

proptest! {
    /// Resolved batch dims are the non-1 value at each aligned position.
    #[test]
    fn broadcast_resolves_to_larger_batch(
        (full, partner) in batch_pair(),
        swap in any::<bool>(),
        m in 1usize..4, k in 1usize..4, n in 1usize..4
    ) {
        let (a_batch, b_batch) = if swap { (partner, full.clone()) } else { (full.clone(), partner) };
        let op = BatchMatMul::new(BatchMatMulConfig::new().with_broadcast(true));
        let shape = op
            .infer_output_shape(
                &Shape::new(with_matrix(&a_batch, m, k)),
                &Shape::new(with_matrix(&b_batch, k, n)),
            )
            .unwrap();
        prop_assert_eq!(shape.dims().to_vec(), with_matrix(&full, m, n));
    }

    /// Strict mode succeeds exactly when the batch shapes are identical.
    #[test]
    fn strict_requires_identical_batches((full, partner) in batch_pair()) {
        let op = BatchMatMul::default();
        let result = op.infer_output_shape(
            &Shape::new(with_matrix(&full, 2, 3)),
            &Shape::new(with_matrix(&partner, 3, 2)),
        );
        if full == partner {
            prop_assert_eq!(result.unwrap().dims().to_vec(), with_matrix(&full, 2, 2));
        } else {
            prop_assert!(result.unwrap_err().is_shape_error());
        }
    }

    /// The parallel backend matches the CPU reference bit for bit.
    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_cpu(
        (full, partner) in batch_pair(),
        m in 1usize..5, k in 0usize..5, n in 1usize..5,
        trans_a in any::<bool>(), trans_b in any::<bool>()
    ) {
        use bmm_ops::bmm_tensor::{ParallelBackend, ParallelConfig};

        let par = ParallelBackend::with_config(ParallelConfig { num_threads: 3, ..ParallelConfig::default() })
            .unwrap();
        let config = BatchMatMulConfig::new()
            .with_broadcast(true)
            .with_trans_a(trans_a)
            .with_trans_b(trans_b);
        let a_dims = if trans_a { with_matrix(&partner, k, m) } else { with_matrix(&partner, m, k) };
        let b_dims = if trans_b { with_matrix(&full, n, k) } else { with_matrix(&full, k, n) };
        let a = filled(a_dims, 3);
        let b = filled(b_dims, 11);

        let op = BatchMatMul::new(config);
        let y_cpu = op.compute(&a, &b, &CpuBackend::new()).unwrap();
        let y_par = op.compute(&a, &b, &par).unwrap();
        prop_assert_eq!(y_cpu, y_par);
    }
}
