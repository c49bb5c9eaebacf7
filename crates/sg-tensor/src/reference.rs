// Naive reference kernels.
//
// These are the ground truth the pipelined kernels are checked against, so
// they favour an obvious summation order over speed.

use crate::error::{Result, TensorError};
use crate::layout::Layout;
use crate::tensor::Tensor;
use crate::view::TensorRef;

/// Triple-loop GEMM: `D[m][n] = sum_k A[m][k] * B[n][k]`.
///
/// - `a`: view of shape `[m, k]`
/// - `b`: view of shape `[n, k]` (both operands are indexed along k; pass a
///   transposed layout to multiply by a `[k, n]` matrix)
/// - Returns: row-major tensor of shape `[m, n]`
///
/// The reduction runs in ascending k with a single `f32` accumulator per
/// output element.
pub fn gemm_nt(a: &TensorRef<'_>, b: &TensorRef<'_>) -> Result<Tensor> {
    let (m, k) = (a.rows(), a.cols());
    let n = b.rows();
    if b.cols() != k {
        return Err(TensorError::ShapeMismatch {
            expected: (n, k),
            got: (b.rows(), b.cols()),
        });
    }

    let mut d = vec![0.0f32; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a.get(i, p) * b.get(j, p);
            }
            d[i * n + j] = sum;
        }
    }
    Tensor::with_layout(d, Layout::row_major(m, n))
}

/// Largest absolute element-wise difference between two equally shaped views.
pub fn max_abs_diff(x: &TensorRef<'_>, y: &TensorRef<'_>) -> Result<f32> {
    if (x.rows(), x.cols()) != (y.rows(), y.cols()) {
        return Err(TensorError::ShapeMismatch {
            expected: (x.rows(), x.cols()),
            got: (y.rows(), y.cols()),
        });
    }
    let mut worst = 0.0f32;
    for r in 0..x.rows() {
        for c in 0..x.cols() {
            worst = worst.max((x.get(r, c) - y.get(r, c)).abs());
        }
    }
    Ok(worst)
}
