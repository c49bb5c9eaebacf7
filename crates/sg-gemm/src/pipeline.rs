use sg_tensor::layout::ceil_div;
use sg_tensor::{TensorMut, TensorRef};

use crate::compute::ComputeEngine;
use crate::config::GemmConfig;
use crate::copy::{CopyEngine, Region, TiledCopy};
use crate::epilogue::Epilogue;
use crate::fragment::AccumulatorFragment;
use crate::problem::WorkItem;
use crate::staging::StagingPipeline;
use crate::stats::PipelineStats;

/// A group's finished accumulators, ready for the epilogue.
#[derive(Debug, Clone)]
pub struct FinishedTile {
    pub work_item: WorkItem,
    /// Global coordinate of the tile's first output element.
    pub origin: (usize, usize),
    pub fragments: Vec<(Region, AccumulatorFragment)>,
    pub stats: PipelineStats,
}

/// One pipeline instance: a compute group computing one output tile.
///
/// Staging slots and register fragments are allocated here, reused for every
/// k-tile, and dropped once the accumulators are handed to the epilogue.
#[derive(Debug)]
pub struct GemmPipeline<'c, E> {
    config: &'c GemmConfig,
    work_item: WorkItem,
    staging: StagingPipeline<E>,
    compute: ComputeEngine,
}

impl<'c, 'a> GemmPipeline<'c, TiledCopy<'a>> {
    /// Build the pipeline for `work_item` over operands `a` (`[M, K]`) and
    /// `b` (`[N, K]`). The config is assumed validated.
    pub fn new(config: &'c GemmConfig, work_item: WorkItem, a: TensorRef<'a>, b: TensorRef<'a>) -> Self {
        let tile = config.tile;
        let (row0, col0) = work_item.origin(&tile);
        let k = a.cols();
        let a_strip = a.tile(row0, 0, tile.m, k);
        let b_strip = b.tile(col0, 0, tile.n, k);
        let k_tiles = ceil_div(k, tile.k);
        let copy = TiledCopy::new(a_strip, b_strip, config, k_tiles);
        GemmPipeline::with_engine(config, work_item, copy)
    }
}

impl<'c, E: CopyEngine> GemmPipeline<'c, E> {
    /// Build the pipeline around any copy engine.
    pub fn with_engine(config: &'c GemmConfig, work_item: WorkItem, engine: E) -> Self {
        GemmPipeline {
            config,
            work_item,
            staging: StagingPipeline::new(engine, &config.tile, config.stages, config.prefetch_distance),
            compute: ComputeEngine::new(config),
        }
    }

    /// Stream the whole reduction and return the finished accumulators.
    pub fn mainloop(mut self) -> FinishedTile {
        self.compute.mainloop(&mut self.staging);

        let transfers = *self.staging.stats();
        assert_eq!(
            transfers.transfers_issued(),
            self.staging.k_tile_count(),
            "pipeline issued a different number of transfers than k-tiles"
        );
        let stats = PipelineStats {
            k_tiles: self.staging.k_tile_count(),
            transfers,
            barriers: self.compute.barriers(),
            register_loads: self.compute.register_loads(),
            mma_steps: self.compute.mma_steps(),
        };
        log::trace!("work item {:?}: {}", self.work_item, stats);

        FinishedTile {
            work_item: self.work_item,
            origin: self.work_item.origin(&self.config.tile),
            fragments: self.compute.into_accumulators(),
            stats,
        }
    }

    /// Run to completion: mainloop, then the epilogue write into `out`.
    pub fn run(self, out: &mut TensorMut<'_>) -> PipelineStats {
        let epilogue = Epilogue::new(self.config.epilogue);
        let finished = self.mainloop();
        epilogue.apply(finished.origin, &finished.fragments, out);
        finished.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sg_tensor::reference::gemm_nt;
    use sg_tensor::{Layout, Tensor};

    fn random(layout: Layout, seed: u64) -> Tensor {
        let mut rng = StdRng::seed_from_u64(seed);
        Tensor::from_fn(layout, |_, _| rng.gen_range(-1.0f32..1.0))
    }

    fn scenario_config() -> GemmConfig {
        GemmConfig::default()
            .with_tile(64, 64, 32)
            .with_stages(3)
            .with_workers(2, 2)
            .with_copy_grid(4, 1)
            .with_mma_k(8)
    }

    #[test]
    fn test_scenario_256x256x128_one_group() {
        let cfg = scenario_config();
        cfg.validate().unwrap();
        let a = random(Layout::row_major(256, 128), 1);
        let b = random(Layout::col_major(256, 128), 2);
        let item = WorkItem::new(1, 2);

        let finished = GemmPipeline::new(&cfg, item, a.view(), b.view()).mainloop();
        assert_eq!(finished.stats.k_tiles, 4);
        assert_eq!(finished.stats.transfers.prologue_transfers, 2);
        assert_eq!(finished.stats.transfers.mainloop_transfers, 2);
        assert!(finished.stats.transfers.max_outstanding <= 2);
        assert_eq!(finished.origin, (64, 128));

        // Reference: the four block-tile products summed independently.
        let a_strip = a.view().tile(64, 0, 64, 128);
        let b_strip = b.view().tile(128, 0, 64, 128);
        let mut expected = vec![0.0f32; 64 * 64];
        for kt in 0..4 {
            let part = gemm_nt(&a_strip.tile(0, kt * 32, 64, 32), &b_strip.tile(0, kt * 32, 64, 32)).unwrap();
            for (e, p) in expected.iter_mut().zip(part.data()) {
                *e += p;
            }
        }
        for (region, acc) in &finished.fragments {
            for i in 0..region.rows {
                for j in 0..region.cols {
                    let want = expected[(region.row + i) * 64 + region.col + j];
                    assert_relative_eq!(acc.get(i, j), want, epsilon = 1e-4, max_relative = 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_run_writes_only_its_tile() {
        let cfg = scenario_config();
        let a = random(Layout::row_major(128, 64), 3);
        let b = random(Layout::row_major(128, 64), 4);
        let mut out = Tensor::from_fn(Layout::row_major(128, 128), |_, _| -7.0);

        let stats = GemmPipeline::new(&cfg, WorkItem::new(0, 1), a.view(), b.view()).run(&mut out.view_mut());
        assert_eq!(stats.transfers.transfers_issued(), 2);

        let expected = gemm_nt(&a.view(), &b.view()).unwrap();
        assert_eq!(out.get(0, 0), -7.0);
        assert_eq!(out.get(127, 63), -7.0);
        assert_eq!(out.get(5, 70), expected.get(5, 70));
        assert_eq!(out.get(63, 127), expected.get(63, 127));
        assert_eq!(out.get(64, 64), -7.0);
    }
}
