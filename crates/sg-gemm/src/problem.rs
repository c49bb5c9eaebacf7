use sg_tensor::layout::ceil_div;
use sg_tensor::{TensorMut, TensorRef};

use crate::config::TileShape;
use crate::error::{GemmError, Result};

/// Global GEMM extents: `D[m, n] = sum over k of A[m, k] * B[n, k]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProblemShape {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl ProblemShape {
    pub fn new(m: usize, n: usize, k: usize) -> Self {
        ProblemShape { m, n, k }
    }

    /// Derive the problem from operand views, checking that they agree.
    pub fn from_operands(a: &TensorRef<'_>, b: &TensorRef<'_>, d: &TensorMut<'_>) -> Result<Self> {
        let (m, k) = (a.rows(), a.cols());
        let n = b.rows();
        if b.cols() != k || d.rows() != m || d.cols() != n {
            return Err(GemmError::OperandMismatch {
                a: (a.rows(), a.cols()),
                b: (b.rows(), b.cols()),
                d: (d.rows(), d.cols()),
            });
        }
        Ok(ProblemShape { m, n, k })
    }

    /// Number of reduction-dimension block tiles.
    pub fn k_tiles(&self, tile: &TileShape) -> usize {
        ceil_div(self.k, tile.k)
    }

    /// Output tiles along m and n.
    pub fn grid(&self, tile: &TileShape) -> GridShape {
        GridShape {
            rows: ceil_div(self.m, tile.m),
            cols: ceil_div(self.n, tile.n),
        }
    }
}

/// Which output tile one pipeline instance is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkItem {
    pub group_row: usize,
    pub group_col: usize,
}

impl WorkItem {
    pub fn new(group_row: usize, group_col: usize) -> Self {
        WorkItem {
            group_row,
            group_col,
        }
    }

    /// Global `(row, col)` of the tile's first output element.
    pub fn origin(&self, tile: &TileShape) -> (usize, usize) {
        (self.group_row * tile.m, self.group_col * tile.n)
    }
}

/// Number of output tiles in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every work item, row by row.
    pub fn work_items(&self) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(self.len());
        for r in 0..self.rows {
            for c in 0..self.cols {
                items.push(WorkItem::new(r, c));
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_tensor::{Layout, Tensor};

    #[test]
    fn test_grid_even() {
        let p = ProblemShape::new(256, 256, 128);
        let tile = TileShape::new(64, 64, 32);
        assert_eq!(p.k_tiles(&tile), 4);
        let g = p.grid(&tile);
        assert_eq!((g.rows, g.cols), (4, 4));
        assert_eq!(g.work_items().len(), 16);
    }

    #[test]
    fn test_grid_residue() {
        let p = ProblemShape::new(70, 10, 33);
        let tile = TileShape::new(64, 64, 32);
        assert_eq!(p.k_tiles(&tile), 2);
        assert_eq!(p.grid(&tile).len(), 2);
    }

    #[test]
    fn test_work_item_origin() {
        let tile = TileShape::new(64, 32, 16);
        assert_eq!(WorkItem::new(2, 3).origin(&tile), (128, 96));
    }

    #[test]
    fn test_from_operands() {
        let a = Tensor::zeros(Layout::row_major(4, 3));
        let b = Tensor::zeros(Layout::col_major(5, 3));
        let mut d = Tensor::zeros(Layout::row_major(4, 5));
        let p = ProblemShape::from_operands(&a.view(), &b.view(), &d.view_mut()).unwrap();
        assert_eq!(p, ProblemShape::new(4, 5, 3));
    }

    #[test]
    fn test_from_operands_mismatch() {
        let a = Tensor::zeros(Layout::row_major(4, 3));
        let b = Tensor::zeros(Layout::row_major(5, 2));
        let mut d = Tensor::zeros(Layout::row_major(4, 5));
        assert!(matches!(
            ProblemShape::from_operands(&a.view(), &b.view(), &d.view_mut()),
            Err(GemmError::OperandMismatch { .. })
        ));
    }
}
