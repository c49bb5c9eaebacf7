//! `sg-gemm` - Multistage pipelined block-tile GEMM for staged-gemm.
//!
//! This crate provides:
//! - A `StagingPipeline` that keeps several k-tiles of both operands in
//!   flight between bulk storage and a ring of staging slots
//! - A `ComputeEngine` that double-buffers register fragments out of the
//!   staging ring and accumulates them, rounding to the compute format first
//! - A `CopyEngine` trait with a cooperative `TiledCopy` implementation
//! - An `Epilogue` writing accumulators back with residue predication
//! - A host driver `gemm` running one pipeline per output tile on a thread pool
//!
//! Operands follow the NT convention: `A` is `[M, K]`, `B` is `[N, K]`, and
//! `D[m, n] = sum over k of A[m, k] * B[n, k]`.

pub mod barrier;
pub mod compute;
pub mod config;
pub mod copy;
pub mod epilogue;
pub mod error;
pub mod fragment;
pub mod launch;
pub mod pipeline;
pub mod problem;
pub mod ring;
pub mod rounding;
pub mod staging;
pub mod stats;
pub mod tile_iter;

// Re-export primary types at the crate root for convenience.
pub use compute::ComputeEngine;
pub use config::{GemmConfig, TileShape, WorkerGrid};
pub use copy::{CopyEngine, Region, TiledCopy};
pub use epilogue::{Epilogue, EpilogueMode};
pub use error::{GemmError, Result};
pub use launch::{gemm, GemmReport};
pub use pipeline::{FinishedTile, GemmPipeline};
pub use problem::{ProblemShape, WorkItem};
pub use rounding::Rounding;
pub use staging::{SlotState, StageBuffer, StagingPipeline};
pub use stats::{PipelineStats, TransferStats};
