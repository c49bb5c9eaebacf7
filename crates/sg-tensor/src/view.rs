use crate::error::{Result, TensorError};
use crate::layout::Layout;

/// A read-only strided view over borrowed `f32` storage.
///
/// `base` is the linear offset of element `(0, 0)` inside `data`, which lets
/// block tiles share the parent's storage without copying.
#[derive(Debug, Clone, Copy)]
pub struct TensorRef<'a> {
    data: &'a [f32],
    base: usize,
    layout: Layout,
}

impl<'a> TensorRef<'a> {
    /// Wrap `data` with `layout`.
    ///
    /// # Errors
    /// Returns an error if `data` is shorter than `layout.cosize()`.
    pub fn new(data: &'a [f32], layout: Layout) -> Result<Self> {
        if data.len() < layout.cosize() {
            return Err(TensorError::StorageTooSmall {
                len: data.len(),
                required: layout.cosize(),
            });
        }
        Ok(TensorRef {
            data,
            base: 0,
            layout,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    /// Element at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the view.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(
            row < self.rows() && col < self.cols(),
            "({row}, {col}) out of bounds for {}",
            self.layout
        );
        self.data[self.base + self.layout.offset(row, col)]
    }

    /// Element at `(row, col)`, or zero when the coordinate falls outside the view.
    #[inline]
    pub fn get_or_zero(&self, row: usize, col: usize) -> f32 {
        if row < self.rows() && col < self.cols() {
            self.data[self.base + self.layout.offset(row, col)]
        } else {
            0.0
        }
    }

    /// A block tile starting at `(row0, col0)` with nominal extent `rows x cols`.
    ///
    /// The extent is clamped to what remains of this view, so tiles on the
    /// bottom/right edge of a non-divisible problem come back smaller. An
    /// origin past the end yields an empty tile.
    pub fn tile(&self, row0: usize, col0: usize, rows: usize, cols: usize) -> TensorRef<'a> {
        let rows = rows.min(self.rows().saturating_sub(row0));
        let cols = cols.min(self.cols().saturating_sub(col0));
        let base = if rows == 0 || cols == 0 {
            self.base
        } else {
            self.base + self.layout.offset(row0, col0)
        };
        TensorRef {
            data: self.data,
            base,
            layout: self.layout.with_extent(rows, cols),
        }
    }

    /// Copies the view into a row-major vector.
    pub fn to_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.layout.numel());
        for r in 0..self.rows() {
            for c in 0..self.cols() {
                out.push(self.data[self.base + self.layout.offset(r, c)]);
            }
        }
        out
    }
}

/// A mutable strided view over borrowed `f32` storage.
#[derive(Debug)]
pub struct TensorMut<'a> {
    data: &'a mut [f32],
    layout: Layout,
}

impl<'a> TensorMut<'a> {
    /// Wrap `data` with `layout`.
    ///
    /// # Errors
    /// Returns an error if `data` is shorter than `layout.cosize()`.
    pub fn new(data: &'a mut [f32], layout: Layout) -> Result<Self> {
        if data.len() < layout.cosize() {
            return Err(TensorError::StorageTooSmall {
                len: data.len(),
                required: layout.cosize(),
            });
        }
        Ok(TensorMut { data, layout })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(
            row < self.rows() && col < self.cols(),
            "({row}, {col}) out of bounds for {}",
            self.layout
        );
        self.data[self.layout.offset(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        assert!(
            row < self.rows() && col < self.cols(),
            "({row}, {col}) out of bounds for {}",
            self.layout
        );
        self.data[self.layout.offset(row, col)] = value;
    }

    /// Reborrow as a read-only view.
    pub fn view(&self) -> TensorRef<'_> {
        TensorRef {
            data: &*self.data,
            base: 0,
            layout: self.layout,
        }
    }
}
