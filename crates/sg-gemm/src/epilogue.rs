use sg_tensor::TensorMut;

use crate::copy::Region;
use crate::fragment::AccumulatorFragment;

/// How finished accumulators are combined with the output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EpilogueMode {
    /// `D = acc`. The existing output is never read.
    #[default]
    Store,
    /// `D = alpha * acc + beta * C`, where `C` is the output's current
    /// contents. `C` is not read when `beta == 0`.
    LinearCombination { alpha: f32, beta: f32 },
}

/// Writes one group's accumulators into its output tile.
#[derive(Debug, Clone, Copy)]
pub struct Epilogue {
    mode: EpilogueMode,
}

impl Epilogue {
    pub fn new(mode: EpilogueMode) -> Self {
        Epilogue { mode }
    }

    /// Store every accumulator element of the tile whose first element is at
    /// global `origin`.
    ///
    /// Element `(i, j)` of a worker fragment covering `region` lands at tile
    /// coordinate `(region.row + i, region.col + j)`, shifted by `origin`.
    /// Coordinates outside `out` (residue of a non-divisible problem) are
    /// skipped. Returns how many elements were written.
    pub fn apply(
        &self,
        origin: (usize, usize),
        fragments: &[(Region, AccumulatorFragment)],
        out: &mut TensorMut<'_>,
    ) -> usize {
        let (rows, cols) = (out.rows(), out.cols());
        let mut written = 0;
        for (region, acc) in fragments {
            for i in 0..acc.rows() {
                let row = origin.0 + region.row + i;
                if row >= rows {
                    break;
                }
                for j in 0..acc.cols() {
                    let col = origin.1 + region.col + j;
                    if col >= cols {
                        break;
                    }
                    let value = match self.mode {
                        EpilogueMode::Store => acc.get(i, j),
                        EpilogueMode::LinearCombination { alpha, beta } if beta == 0.0 => alpha * acc.get(i, j),
                        EpilogueMode::LinearCombination { alpha, beta } => {
                            alpha * acc.get(i, j) + beta * out.get(row, col)
                        }
                    };
                    out.set(row, col, value);
                    written += 1;
                }
            }
        }
        written
    }
}
