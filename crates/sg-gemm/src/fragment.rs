//! Per-worker register fragments.

/// Double-buffered input fragment: one `rows x mma_k` sub-block being
/// computed on while the next is loaded.
#[derive(Debug, Clone)]
pub struct InputFragment {
    buffers: [Vec<f32>; 2],
    rows: usize,
    depth: usize,
}

impl InputFragment {
    pub fn new(rows: usize, depth: usize) -> Self {
        InputFragment {
            buffers: [vec![0.0; rows * depth], vec![0.0; rows * depth]],
            rows,
            depth,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Reduction extent of one sub-block.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn buffer(&self, which: usize) -> &[f32] {
        &self.buffers[which & 1]
    }

    pub fn buffer_mut(&mut self, which: usize) -> &mut [f32] {
        &mut self.buffers[which & 1]
    }
}

/// Running partial sums for a worker's `rows x cols` piece of the output tile.
///
/// Zeroed once at construction and only ever touched by `mma`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorFragment {
    values: Vec<f32>,
    rows: usize,
    cols: usize,
    steps: usize,
}

impl AccumulatorFragment {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        AccumulatorFragment {
            values: vec![0.0; rows * cols],
            rows,
            cols,
            steps: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Partial sum for local element `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of sub-blocks accumulated so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// `acc[i][j] += sum over kk of a[i][kk] * b[j][kk]`, kk ascending.
    ///
    /// `a` is `rows x depth` and `b` is `cols x depth`, both kk-fastest.
    pub fn mma(&mut self, a: &[f32], b: &[f32], depth: usize) {
        assert_eq!(a.len(), self.rows * depth, "A fragment does not match accumulator rows");
        assert_eq!(b.len(), self.cols * depth, "B fragment does not match accumulator cols");
        for i in 0..self.rows {
            let a_row = &a[i * depth..(i + 1) * depth];
            let acc_row = &mut self.values[i * self.cols..(i + 1) * self.cols];
            for (j, acc) in acc_row.iter_mut().enumerate() {
                let b_row = &b[j * depth..(j + 1) * depth];
                let mut sum = *acc;
                for (x, y) in a_row.iter().zip(b_row) {
                    sum += x * y;
                }
                *acc = sum;
            }
        }
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_alternate() {
        let mut f = InputFragment::new(2, 3);
        f.buffer_mut(0).fill(1.0);
        f.buffer_mut(1).fill(2.0);
        assert_eq!(f.buffer(2), &[1.0; 6]);
        assert_eq!(f.buffer(3), &[2.0; 6]);
    }

    #[test]
    fn test_accumulator_starts_at_zero() {
        let acc = AccumulatorFragment::zeros(2, 2);
        assert_eq!(acc.values(), &[0.0; 4]);
        assert_eq!(acc.steps(), 0);
    }

    #[test]
    fn test_mma_accumulates() {
        let mut acc = AccumulatorFragment::zeros(1, 2);
        // a = [1, 2], b rows = [3, 4] and [5, 6]
        acc.mma(&[1.0, 2.0], &[3.0, 4.0, 5.0, 6.0], 2);
        assert_eq!(acc.values(), &[11.0, 17.0]);
        acc.mma(&[1.0, 0.0], &[1.0, 0.0, 2.0, 0.0], 2);
        assert_eq!(acc.values(), &[12.0, 19.0]);
        assert_eq!(acc.steps(), 2);
    }

    #[test]
    #[should_panic]
    fn test_mma_shape_mismatch() {
        let mut acc = AccumulatorFragment::zeros(2, 2);
        acc.mma(&[1.0, 2.0], &[1.0, 2.0, 3.0, 4.0], 2);
    }
}
