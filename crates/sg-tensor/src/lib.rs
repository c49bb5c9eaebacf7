//! `sg-tensor` - Strided tensor views for staged-gemm.
//!
//! This crate provides:
//! - A `Layout` describing a 2-D shape together with explicit strides
//! - Borrowed `TensorRef` / `TensorMut` views and block-tile slicing
//! - An owned `Tensor` for building operands in tests and drivers
//! - Element format definitions (F32, TF32, BF16, F16)
//! - A naive reference GEMM used to check the pipelined kernels

pub mod dtype;
pub mod error;
pub mod layout;
pub mod reference;
pub mod tensor;
pub mod view;

// Re-export primary types at the crate root for convenience.
pub use dtype::DType;
pub use error::{Result, TensorError};
pub use layout::Layout;
pub use tensor::Tensor;
pub use view::{TensorMut, TensorRef};
