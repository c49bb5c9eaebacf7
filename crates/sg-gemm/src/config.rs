use sg_tensor::DType;

use crate::epilogue::EpilogueMode;
use crate::error::{GemmError, Result};
use crate::rounding::Rounding;

/// Block tile extents handled by one compute group per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileShape {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl TileShape {
    pub fn new(m: usize, n: usize, k: usize) -> Self {
        TileShape { m, n, k }
    }
}

/// A 2-D arrangement of the workers in one group.
///
/// Worker `id` sits at row `id / cols`, column `id % cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerGrid {
    pub rows: usize,
    pub cols: usize,
}

impl WorkerGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        WorkerGrid { rows, cols }
    }

    /// Number of workers in the group.
    pub fn count(&self) -> usize {
        self.rows * self.cols
    }

    fn check_divides(&self, what: &'static str, extent_rows: usize, extent_cols: usize) -> Result<()> {
        if self.rows == 0
            || self.cols == 0
            || extent_rows % self.rows != 0
            || extent_cols % self.cols != 0
        {
            return Err(GemmError::PartitionMismatch {
                what,
                rows: self.rows,
                cols: self.cols,
                extent_rows,
                extent_cols,
            });
        }
        Ok(())
    }
}

/// Configuration for one pipelined GEMM.
///
/// Everything here is fixed before launch; `validate` checks the
/// compatibility conditions the pipeline itself never re-checks.
#[derive(Debug, Clone, PartialEq)]
pub struct GemmConfig {
    /// Block tile per group and per stage.
    pub tile: TileShape,
    /// Number of staging slots (pipeline depth).
    pub stages: usize,
    /// Workers splitting the output tile for the multiply-accumulate.
    pub workers: WorkerGrid,
    /// Workers splitting each block tile for the bulk-to-staging copy.
    pub copy_grid: WorkerGrid,
    /// Reduction extent of one register-level multiply-accumulate.
    pub mma_k: usize,
    /// Format operands are rounded to before accumulation.
    pub compute_dtype: DType,
    /// How the accumulator is written back.
    pub epilogue: EpilogueMode,
    /// How many k-tiles past each issued transfer to warm. Zero disables it.
    pub prefetch_distance: usize,
}

impl Default for GemmConfig {
    fn default() -> Self {
        GemmConfig {
            tile: TileShape::new(128, 128, 32),
            stages: 3,
            workers: WorkerGrid::new(2, 2),
            copy_grid: WorkerGrid::new(4, 1),
            mma_k: 8,
            compute_dtype: DType::F32,
            epilogue: EpilogueMode::Store,
            prefetch_distance: 3,
        }
    }
}

impl GemmConfig {
    pub fn with_tile(mut self, m: usize, n: usize, k: usize) -> Self {
        self.tile = TileShape::new(m, n, k);
        self
    }

    pub fn with_stages(mut self, stages: usize) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_workers(mut self, rows: usize, cols: usize) -> Self {
        self.workers = WorkerGrid::new(rows, cols);
        self
    }

    pub fn with_copy_grid(mut self, rows: usize, cols: usize) -> Self {
        self.copy_grid = WorkerGrid::new(rows, cols);
        self
    }

    pub fn with_mma_k(mut self, mma_k: usize) -> Self {
        self.mma_k = mma_k;
        self
    }

    pub fn with_compute_dtype(mut self, dtype: DType) -> Self {
        self.compute_dtype = dtype;
        self
    }

    pub fn with_epilogue(mut self, epilogue: EpilogueMode) -> Self {
        self.epilogue = epilogue;
        self
    }

    pub fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    /// Inner sub-block steps per staged tile: `tile.k / mma_k`.
    pub fn k_block_max(&self) -> usize {
        self.tile.k / self.mma_k
    }

    /// Rows and columns of the output tile owned by one mma worker.
    pub fn worker_tile(&self) -> (usize, usize) {
        (self.tile.m / self.workers.rows, self.tile.n / self.workers.cols)
    }

    /// Rounding applied to input fragments before each multiply-accumulate.
    pub fn rounding(&self) -> Rounding {
        Rounding::from(self.compute_dtype)
    }

    /// `f32` elements of staging memory one group needs for all slots.
    pub fn staging_floats(&self) -> usize {
        self.stages * (self.tile.m + self.tile.n) * self.tile.k
    }

    /// Checks every static compatibility condition between tile, fragment
    /// and worker shapes.
    pub fn validate(&self) -> Result<()> {
        if self.stages < 2 {
            return Err(GemmError::InvalidStages(self.stages));
        }
        let TileShape { m, n, k } = self.tile;
        if m == 0 || n == 0 || k == 0 {
            return Err(GemmError::EmptyTile { m, n, k });
        }
        if self.mma_k == 0 || k % self.mma_k != 0 {
            return Err(GemmError::FragmentMismatch {
                tile_k: k,
                mma_k: self.mma_k,
            });
        }
        self.workers.check_divides("mma", m, n)?;
        self.copy_grid.check_divides("copy A", m, k)?;
        self.copy_grid.check_divides("copy B", n, k)?;
        if self.copy_grid.count() != self.workers.count() {
            return Err(GemmError::WorkerCountMismatch {
                copy: self.copy_grid.count(),
                mma: self.workers.count(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = GemmConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.k_block_max(), 4);
        assert_eq!(cfg.worker_tile(), (64, 64));
        assert_eq!(cfg.staging_floats(), 3 * 256 * 32);
    }

    #[test]
    fn test_single_stage_rejected() {
        let cfg = GemmConfig::default().with_stages(1);
        assert_eq!(cfg.validate(), Err(GemmError::InvalidStages(1)));
    }

    #[test]
    fn test_fragment_mismatch() {
        let cfg = GemmConfig::default().with_mma_k(12);
        assert!(matches!(
            cfg.validate(),
            Err(GemmError::FragmentMismatch { tile_k: 32, mma_k: 12 })
        ));
    }

    #[test]
    fn test_worker_partition_mismatch() {
        let cfg = GemmConfig::default().with_tile(96, 128, 32).with_workers(5, 1).with_copy_grid(5, 1);
        assert!(matches!(
            cfg.validate(),
            Err(GemmError::PartitionMismatch { what: "mma", .. })
        ));
    }

    #[test]
    fn test_copy_grid_count_mismatch() {
        let cfg = GemmConfig::default().with_copy_grid(2, 1);
        assert_eq!(
            cfg.validate(),
            Err(GemmError::WorkerCountMismatch { copy: 2, mma: 4 })
        );
    }

    #[test]
    fn test_empty_tile() {
        let cfg = GemmConfig::default().with_tile(0, 64, 32);
        assert!(matches!(cfg.validate(), Err(GemmError::EmptyTile { .. })));
    }

    #[test]
    fn test_rounding_follows_dtype() {
        let cfg = GemmConfig::default().with_compute_dtype(DType::Tf32);
        assert_eq!(cfg.rounding(), Rounding::Tf32);
    }
}
