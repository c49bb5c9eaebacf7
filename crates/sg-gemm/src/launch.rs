use rayon::prelude::*;
use sg_tensor::{TensorMut, TensorRef};

use crate::config::GemmConfig;
use crate::epilogue::Epilogue;
use crate::error::Result;
use crate::pipeline::{FinishedTile, GemmPipeline};
use crate::problem::ProblemShape;
use crate::stats::PipelineStats;

/// Summary of one `gemm` launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmReport {
    pub problem: ProblemShape,
    /// Pipeline instances launched, one per output tile.
    pub work_items: usize,
    /// Counters summed over every work item.
    pub stats: PipelineStats,
}

/// Compute `out = epilogue(A * B^T)` with one pipeline per output tile.
///
/// - `a`: `[M, K]`
/// - `b`: `[N, K]`
/// - `out`: `[M, N]`, any strides
///
/// Groups run their mainloops in parallel; each owns a disjoint output tile,
/// so the epilogue writes never overlap.
pub fn gemm(
    config: &GemmConfig,
    a: &TensorRef<'_>,
    b: &TensorRef<'_>,
    out: &mut TensorMut<'_>,
) -> Result<GemmReport> {
    config.validate()?;
    let problem = ProblemShape::from_operands(a, b, out)?;
    let grid = problem.grid(&config.tile);
    log::debug!(
        "gemm {}x{}x{}: {} work items, {} k-tiles each, {} stages, compute {}",
        problem.m,
        problem.n,
        problem.k,
        grid.len(),
        problem.k_tiles(&config.tile),
        config.stages,
        config.compute_dtype
    );

    let finished: Vec<FinishedTile> = grid
        .work_items()
        .into_par_iter()
        .map(|item| GemmPipeline::new(config, item, *a, *b).mainloop())
        .collect();

    let epilogue = Epilogue::new(config.epilogue);
    let mut stats = PipelineStats::default();
    for tile in &finished {
        epilogue.apply(tile.origin, &tile.fragments, out);
        stats.merge(&tile.stats);
    }
    log::debug!("gemm done: {stats}");

    Ok(GemmReport {
        problem,
        work_items: finished.len(),
        stats,
    })
}
