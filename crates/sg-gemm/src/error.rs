use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GemmError {
    #[error("pipeline needs at least 2 stages, got {0}")]
    InvalidStages(usize),
    #[error("block tile {m}x{n}x{k} has a zero extent")]
    EmptyTile { m: usize, n: usize, k: usize },
    #[error("tile k extent {tile_k} is not a multiple of the fragment k extent {mma_k}")]
    FragmentMismatch { tile_k: usize, mma_k: usize },
    #[error("{what} grid {rows}x{cols} does not evenly partition a {extent_rows}x{extent_cols} tile")]
    PartitionMismatch {
        what: &'static str,
        rows: usize,
        cols: usize,
        extent_rows: usize,
        extent_cols: usize,
    },
    #[error("copy grid has {copy} workers but the mma grid has {mma}")]
    WorkerCountMismatch { copy: usize, mma: usize },
    #[error("gemm operand mismatch: A is {a:?}, B is {b:?}, D is {d:?}")]
    OperandMismatch {
        a: (usize, usize),
        b: (usize, usize),
        d: (usize, usize),
    },
    #[error("tensor error: {0}")]
    Tensor(#[from] sg_tensor::TensorError),
}

pub type Result<T> = std::result::Result<T, GemmError>;
