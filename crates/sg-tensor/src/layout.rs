use std::fmt;

/// A 2-D shape together with the strides used to address it.
///
/// Element `(row, col)` lives at `row * row_stride + col * col_stride` from
/// the start of the view. Strides are resolved at configuration time; nothing
/// about them is baked into types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    rows: usize,
    cols: usize,
    row_stride: usize,
    col_stride: usize,
}

impl Layout {
    /// Create a layout from explicit shape and strides.
    pub fn strided(rows: usize, cols: usize, row_stride: usize, col_stride: usize) -> Self {
        Layout {
            rows,
            cols,
            row_stride,
            col_stride,
        }
    }

    /// Row-major contiguous layout: columns are adjacent in memory.
    pub fn row_major(rows: usize, cols: usize) -> Self {
        Layout::strided(rows, cols, cols, 1)
    }

    /// Column-major contiguous layout: rows are adjacent in memory.
    pub fn col_major(rows: usize, cols: usize) -> Self {
        Layout::strided(rows, cols, 1, rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn col_stride(&self) -> usize {
        self.col_stride
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of logical elements.
    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Linear offset of element `(row, col)`. No bounds check.
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.col_stride
    }

    /// Minimum storage length needed to back every element of this layout.
    pub fn cosize(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.offset(self.rows - 1, self.cols - 1) + 1
    }

    /// Checks whether this layout is the contiguous row-major layout for its shape.
    pub fn is_row_major(&self) -> bool {
        self.col_stride == 1 && self.row_stride == self.cols
    }

    /// Checks whether this layout is the contiguous column-major layout for its shape.
    pub fn is_col_major(&self) -> bool {
        self.row_stride == 1 && self.col_stride == self.rows
    }

    /// The same strides restricted to a smaller extent.
    pub fn with_extent(&self, rows: usize, cols: usize) -> Self {
        Layout::strided(rows, cols, self.row_stride, self.col_stride)
    }

    /// Swaps the roles of rows and columns without moving any data.
    pub fn transposed(&self) -> Self {
        Layout::strided(self.cols, self.rows, self.col_stride, self.row_stride)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}]:({}, {})",
            self.rows, self.cols, self.row_stride, self.col_stride
        )
    }
}

/// Number of `tile`-sized pieces needed to cover `extent`.
pub fn ceil_div(extent: usize, tile: usize) -> usize {
    extent.div_ceil(tile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major() {
        let l = Layout::row_major(2, 3);
        assert_eq!(l.shape(), (2, 3));
        assert_eq!(l.numel(), 6);
        assert_eq!(l.offset(1, 2), 5);
        assert_eq!(l.cosize(), 6);
        assert!(l.is_row_major());
        assert!(!l.is_col_major());
    }

    #[test]
    fn test_col_major() {
        let l = Layout::col_major(2, 3);
        assert_eq!(l.offset(1, 0), 1);
        assert_eq!(l.offset(0, 1), 2);
        assert_eq!(l.cosize(), 6);
        assert!(l.is_col_major());
    }

    #[test]
    fn test_leading_dimension_padding() {
        // 3x2 column-major with ld = 5
        let l = Layout::strided(3, 2, 1, 5);
        assert_eq!(l.offset(2, 1), 7);
        assert_eq!(l.cosize(), 8);
    }

    #[test]
    fn test_empty_cosize() {
        assert_eq!(Layout::row_major(0, 4).cosize(), 0);
        assert!(Layout::row_major(3, 0).is_empty());
    }

    #[test]
    fn test_transposed() {
        let l = Layout::row_major(2, 3).transposed();
        assert_eq!(l.shape(), (3, 2));
        assert!(l.is_col_major());
    }

    #[test]
    fn test_display() {
        assert_eq!(Layout::row_major(2, 3).to_string(), "[2, 3]:(3, 1)");
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(128, 32), 4);
        assert_eq!(ceil_div(130, 32), 5);
        assert_eq!(ceil_div(0, 32), 0);
    }
}
