use crate::error::{Result, TensorError};
use crate::layout::Layout;
use crate::view::{TensorMut, TensorRef};

/// An owned 2-D tensor: `f32` storage plus the layout used to address it.
///
/// Used to build operands and outputs; the pipeline itself only ever sees
/// borrowed `TensorRef` / `TensorMut` views.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    layout: Layout,
}

impl Tensor {
    /// Create a row-major tensor from data.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "data length {} does not match shape [{}, {}]",
            data.len(),
            rows,
            cols
        );
        Tensor {
            data,
            layout: Layout::row_major(rows, cols),
        }
    }

    /// Create a tensor over `data` with an arbitrary strided layout.
    ///
    /// # Errors
    /// Returns an error if `data` cannot back every element of `layout`.
    pub fn with_layout(data: Vec<f32>, layout: Layout) -> Result<Self> {
        if data.len() < layout.cosize() {
            return Err(TensorError::StorageTooSmall {
                len: data.len(),
                required: layout.cosize(),
            });
        }
        Ok(Tensor { data, layout })
    }

    /// Create a zero-filled tensor with the given layout.
    pub fn zeros(layout: Layout) -> Self {
        Tensor {
            data: vec![0.0; layout.cosize()],
            layout,
        }
    }

    /// Create a tensor whose element `(r, c)` is `f(r, c)`.
    pub fn from_fn(layout: Layout, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut t = Tensor::zeros(layout);
        for r in 0..layout.rows() {
            for c in 0..layout.cols() {
                t.data[layout.offset(r, c)] = f(r, c);
            }
        }
        t
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.layout.shape()
    }

    /// The raw backing storage, in memory order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.view().get(row, col)
    }

    /// Borrow as a read-only view.
    pub fn view(&self) -> TensorRef<'_> {
        TensorRef::new(&self.data, self.layout).expect("storage sized at construction")
    }

    /// Borrow as a mutable view.
    pub fn view_mut(&mut self) -> TensorMut<'_> {
        TensorMut::new(&mut self.data, self.layout).expect("storage sized at construction")
    }

    /// Copies the logical elements into a row-major vector.
    pub fn to_row_major(&self) -> Vec<f32> {
        self.view().to_vec()
    }

    /// Reinterpret the same storage under a different layout.
    pub fn relayout(&self, layout: Layout) -> Result<Tensor> {
        if layout.numel() != self.layout.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: self.layout.shape(),
                got: layout.shape(),
            });
        }
        Tensor::with_layout(self.data.clone(), layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tensor() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert_eq!(t.shape(), (2, 3));
        assert!(t.layout().is_row_major());
        assert_eq!(t.get(1, 0), 4.0);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic]
    fn test_new_shape_mismatch_panics() {
        let _t = Tensor::new(vec![1.0, 2.0], 1, 3);
    }

    #[test]
    fn test_from_fn_col_major() {
        let t = Tensor::from_fn(Layout::col_major(2, 3), |r, c| (r * 10 + c) as f32);
        assert_eq!(t.data(), &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0]);
        assert_eq!(t.to_row_major(), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_with_layout_too_small() {
        assert!(Tensor::with_layout(vec![0.0; 3], Layout::row_major(2, 2)).is_err());
    }

    #[test]
    fn test_relayout() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let r = t.relayout(Layout::row_major(3, 2)).unwrap();
        assert_eq!(r.get(2, 1), 6.0);
        assert!(t.relayout(Layout::row_major(4, 2)).is_err());
    }

    #[test]
    fn test_view_mut_writes_through() {
        let mut t = Tensor::zeros(Layout::row_major(2, 2));
        t.view_mut().set(1, 1, 3.0);
        assert_eq!(t.get(1, 1), 3.0);
    }
}
