use std::hint::black_box;

use sg_tensor::TensorRef;

use crate::config::{GemmConfig, TileShape, WorkerGrid};
use crate::staging::StageBuffer;

/// A rectangular piece of a tile, in tile-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

/// The piece of a `extent_rows x extent_cols` tile owned by `worker_id`.
///
/// Workers are laid out `groups_per_col` high and `groups_per_row` wide,
/// row-major by id; each owns an equal, disjoint block. The grid must divide
/// the extent (checked by `GemmConfig::validate`).
pub fn partition(
    worker_id: usize,
    groups_per_row: usize,
    groups_per_col: usize,
    extent_rows: usize,
    extent_cols: usize,
) -> Region {
    assert!(
        worker_id < groups_per_row * groups_per_col,
        "worker {worker_id} outside a {groups_per_col}x{groups_per_row} grid"
    );
    let rows = extent_rows / groups_per_col;
    let cols = extent_cols / groups_per_row;
    Region {
        row: (worker_id / groups_per_row) * rows,
        col: (worker_id % groups_per_row) * cols,
        rows,
        cols,
    }
}

/// `partition` over a `WorkerGrid`.
pub fn partition_grid(worker_id: usize, grid: &WorkerGrid, extent_rows: usize, extent_cols: usize) -> Region {
    partition(worker_id, grid.cols, grid.rows, extent_rows, extent_cols)
}

/// Moves block tiles from bulk storage into staging slots.
pub trait CopyEngine {
    /// Number of reduction-dimension tiles this engine can deliver.
    fn k_tile_count(&self) -> usize;

    /// Fill `slot` with both operands' block for reduction tile `k_tile`.
    fn copy_tile(&self, k_tile: usize, slot: &mut StageBuffer);

    /// Hint that `k_tile` will be needed soon. Must not change any result.
    fn prefetch(&self, _k_tile: usize) {}
}

/// Cooperative copy: every worker of the copy grid moves its own disjoint
/// region of each operand's block tile. Elements outside the operand (the
/// residue of a non-divisible problem) are written as zero.
#[derive(Debug, Clone)]
pub struct TiledCopy<'a> {
    a: TensorRef<'a>,
    b: TensorRef<'a>,
    tile: TileShape,
    grid: WorkerGrid,
    k_tiles: usize,
}

impl<'a> TiledCopy<'a> {
    /// `a` is the group's `tile.m x K` strip of A, `b` its `tile.n x K` strip of B.
    pub fn new(a: TensorRef<'a>, b: TensorRef<'a>, config: &GemmConfig, k_tiles: usize) -> Self {
        TiledCopy {
            a,
            b,
            tile: config.tile,
            grid: config.copy_grid,
            k_tiles,
        }
    }

    fn copy_operand(&self, src: &TensorRef<'_>, rows: usize, k0: usize, dst: &mut [f32]) {
        let depth = self.tile.k;
        for worker in 0..self.grid.count() {
            let region = partition_grid(worker, &self.grid, rows, depth);
            for r in region.row..region.row + region.rows {
                let dst_row = &mut dst[r * depth..(r + 1) * depth];
                for c in region.col..region.col + region.cols {
                    dst_row[c] = src.get_or_zero(r, k0 + c);
                }
            }
        }
    }

    fn touch_operand(&self, src: &TensorRef<'_>, rows: usize, k0: usize) {
        for worker in 0..self.grid.count() {
            let region = partition_grid(worker, &self.grid, rows, self.tile.k);
            // one read per region row is enough to pull its lines in
            for r in region.row..region.row + region.rows {
                black_box(src.get_or_zero(r, k0 + region.col));
            }
        }
    }
}

impl CopyEngine for TiledCopy<'_> {
    fn k_tile_count(&self) -> usize {
        self.k_tiles
    }

    fn copy_tile(&self, k_tile: usize, slot: &mut StageBuffer) {
        assert!(k_tile < self.k_tiles, "copy of k-tile {k_tile} beyond {} tiles", self.k_tiles);
        let k0 = k_tile * self.tile.k;
        self.copy_operand(&self.a, self.tile.m, k0, &mut slot.a);
        self.copy_operand(&self.b, self.tile.n, k0, &mut slot.b);
    }

    fn prefetch(&self, k_tile: usize) {
        if k_tile >= self.k_tiles {
            return;
        }
        let k0 = k_tile * self.tile.k;
        self.touch_operand(&self.a, self.tile.m, k0);
        self.touch_operand(&self.b, self.tile.n, k0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_tensor::{Layout, Tensor};

    #[test]
    fn test_partition_row_major_ids() {
        // 4 wide, 2 high over a 8x16 extent: each piece is 4x4
        let r = partition(5, 4, 2, 8, 16);
        assert_eq!(r, Region { row: 4, col: 4, rows: 4, cols: 4 });
    }

    #[test]
    fn test_partition_covers_extent_disjointly() {
        let grid = WorkerGrid::new(2, 3);
        let mut hits = vec![0u8; 6 * 9];
        for w in 0..grid.count() {
            let p = partition_grid(w, &grid, 6, 9);
            for r in p.row..p.row + p.rows {
                for c in p.col..p.col + p.cols {
                    hits[r * 9 + c] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    #[should_panic]
    fn test_partition_worker_out_of_grid() {
        let _ = partition(8, 4, 2, 8, 8);
    }

    fn small_config() -> GemmConfig {
        GemmConfig::default()
            .with_tile(4, 2, 4)
            .with_workers(2, 1)
            .with_copy_grid(2, 1)
            .with_mma_k(2)
    }

    #[test]
    fn test_copy_tile_layout() {
        let cfg = small_config();
        let a = Tensor::from_fn(Layout::col_major(4, 8), |r, c| (r * 100 + c) as f32);
        let b = Tensor::from_fn(Layout::row_major(2, 8), |r, c| -((r * 100 + c) as f32));
        let copy = TiledCopy::new(a.view(), b.view(), &cfg, 2);
        let mut slot = StageBuffer::new(&cfg.tile);
        copy.copy_tile(1, &mut slot);
        // row 3 of A, k = 4..8
        assert_eq!(&slot.a[12..16], &[304.0, 305.0, 306.0, 307.0]);
        assert_eq!(&slot.b[4..8], &[-104.0, -105.0, -106.0, -107.0]);
    }

    #[test]
    fn test_copy_zero_fills_residue() {
        let cfg = small_config();
        // 3 rows of A (tile wants 4) and k = 6 (second tile only half full)
        let a = Tensor::from_fn(Layout::row_major(3, 6), |_, _| 1.0);
        let b = Tensor::from_fn(Layout::row_major(2, 6), |_, _| 1.0);
        let copy = TiledCopy::new(a.view(), b.view(), &cfg, 2);
        let mut slot = StageBuffer::new(&cfg.tile);
        slot.a.fill(9.0);
        copy.copy_tile(1, &mut slot);
        assert_eq!(&slot.a[0..4], &[1.0, 1.0, 0.0, 0.0]);
        assert_eq!(&slot.a[12..16], &[0.0; 4]);
    }

    #[test]
    fn test_prefetch_past_end_is_noop() {
        let cfg = small_config();
        let a = Tensor::zeros(Layout::row_major(4, 4));
        let b = Tensor::zeros(Layout::row_major(2, 4));
        let copy = TiledCopy::new(a.view(), b.view(), &cfg, 1);
        copy.prefetch(0);
        copy.prefetch(7);
    }
}
