use crate::backend::Transpose;

/// Reference GEMM kernel: C = op(A) @ op(B), row-major.
///
/// Each output element is a sequential dot product over `k`, so results are
/// reproducible regardless of which backend or thread runs the kernel.
/// Buffer lengths must already be validated.
#[allow(clippy::too_many_arguments)]
pub(crate) fn gemm_f32(
    trans_a: Transpose,
    trans_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) {
    gemm_f32_rows(trans_a, trans_b, m, n, k, a, b, 0, c);
}

/// Computes output rows `row0..row0 + c_rows.len() / n` of op(A) @ op(B)
/// into `c_rows`. Lets callers split one GEMM by rows across threads.
#[allow(clippy::too_many_arguments)]
pub(crate) fn gemm_f32_rows(
    trans_a: Transpose,
    trans_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    b: &[f32],
    row0: usize,
    c_rows: &mut [f32],
) {
    if n == 0 {
        return;
    }
    // (row stride, col stride) of op(A) [m, k] and op(B) [k, n] in storage
    let (a_rs, a_cs) = if trans_a.is_transposed() { (1, m) } else { (k, 1) };
    let (b_rs, b_cs) = if trans_b.is_transposed() { (1, k) } else { (n, 1) };

    for (r, row) in c_rows.chunks_mut(n).enumerate() {
        let i = row0 + r;
        for (j, out) in row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * a_rs + p * a_cs] * b[p * b_rs + j * b_cs];
            }
            *out = sum;
        }
    }
}
