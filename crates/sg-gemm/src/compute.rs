use crate::barrier::GroupBarrier;
use crate::config::GemmConfig;
use crate::copy::{partition_grid, CopyEngine, Region};
use crate::fragment::{AccumulatorFragment, InputFragment};
use crate::rounding::Rounding;
use crate::staging::{StageBuffer, StagingPipeline};

/// Register state of one worker: its piece of the output tile, the two
/// double-buffered input fragments and the accumulator.
#[derive(Debug, Clone)]
struct WorkerFragments {
    region: Region,
    a: InputFragment,
    b: InputFragment,
    acc: AccumulatorFragment,
}

/// Drains staging slots into register fragments and accumulates.
///
/// One engine serves one compute group for one pipeline run. The workers of
/// the group run in lockstep; the only synchronisation between them is the
/// group barrier taken each time the read slot moves.
#[derive(Debug)]
pub struct ComputeEngine {
    workers: Vec<WorkerFragments>,
    barrier: GroupBarrier,
    k_block_max: usize,
    mma_k: usize,
    tile_k: usize,
    rounding: Rounding,
    /// Global sub-block step; its parity selects the register buffer.
    step: usize,
    register_loads: usize,
}

impl ComputeEngine {
    pub fn new(config: &GemmConfig) -> Self {
        let tile = config.tile;
        let workers = (0..config.workers.count())
            .map(|w| {
                let region = partition_grid(w, &config.workers, tile.m, tile.n);
                WorkerFragments {
                    region,
                    a: InputFragment::new(region.rows, config.mma_k),
                    b: InputFragment::new(region.cols, config.mma_k),
                    acc: AccumulatorFragment::zeros(region.rows, region.cols),
                }
            })
            .collect();
        ComputeEngine {
            workers,
            barrier: GroupBarrier::new(config.workers.count()),
            k_block_max: config.k_block_max(),
            mma_k: config.mma_k,
            tile_k: tile.k,
            rounding: config.rounding(),
            step: 0,
            register_loads: 0,
        }
    }

    /// Run the whole reduction through `pipeline`.
    ///
    /// Per staged tile, inner step `j` of `K_BLOCK_MAX`:
    /// 1. `j == 0`: issue the next bulk transfer.
    /// 2. `j == K_BLOCK_MAX - 1`: release the read slot, move to the next
    ///    one and wait + barrier until it is published.
    /// 3. Load sub-block `j + 1` (mod `K_BLOCK_MAX`) into the idle buffers.
    /// 4. Round the active buffers.
    /// 5. Multiply-accumulate sub-block `j`.
    pub fn mainloop<E: CopyEngine>(&mut self, pipeline: &mut StagingPipeline<E>) {
        let k_tiles = pipeline.k_tile_count();
        pipeline.prologue_fill();
        if k_tiles == 0 {
            return;
        }

        self.sync_read_slot(pipeline);
        self.load_fragments(pipeline.read_slot(), 0, 0);

        let k_block_max = self.k_block_max;
        for k_tile in 0..k_tiles {
            let last_tile = k_tile + 1 == k_tiles;
            for j in 0..k_block_max {
                if j == 0 {
                    pipeline.advance_write();
                }
                if j == k_block_max - 1 {
                    pipeline.advance_read();
                    if !last_tile {
                        self.sync_read_slot(pipeline);
                    }
                }
                if !(last_tile && j == k_block_max - 1) {
                    let next = (j + 1) % k_block_max;
                    self.load_fragments(pipeline.read_slot(), next, self.step + 1);
                }
                self.multiply_accumulate(self.step);
                self.step += 1;
            }
        }
    }

    /// Hand over the accumulators, one per worker, with the piece of the
    /// output tile each covers.
    pub fn into_accumulators(self) -> Vec<(Region, AccumulatorFragment)> {
        self.workers.into_iter().map(|w| (w.region, w.acc)).collect()
    }

    pub fn barriers(&self) -> u64 {
        self.barrier.generation()
    }

    pub fn register_loads(&self) -> usize {
        self.register_loads
    }

    pub fn mma_steps(&self) -> usize {
        self.step
    }

    fn sync_read_slot<E: CopyEngine>(&mut self, pipeline: &mut StagingPipeline<E>) {
        pipeline.wait_ready(pipeline.pending_after_read());
        self.barrier.sync_all();
        pipeline.publish();
    }

    fn load_fragments(&mut self, slot: &StageBuffer, sub_block: usize, buffer: usize) {
        let depth = self.mma_k;
        let k0 = sub_block * depth;
        for w in self.workers.iter_mut() {
            let dst = w.a.buffer_mut(buffer);
            for i in 0..w.region.rows {
                let src = (w.region.row + i) * self.tile_k + k0;
                dst[i * depth..(i + 1) * depth].copy_from_slice(&slot.a[src..src + depth]);
            }
            let dst = w.b.buffer_mut(buffer);
            for j in 0..w.region.cols {
                let src = (w.region.col + j) * self.tile_k + k0;
                dst[j * depth..(j + 1) * depth].copy_from_slice(&slot.b[src..src + depth]);
            }
        }
        self.register_loads += 1;
    }

    fn multiply_accumulate(&mut self, buffer: usize) {
        for w in self.workers.iter_mut() {
            self.rounding.apply_slice(w.a.buffer_mut(buffer));
            self.rounding.apply_slice(w.b.buffer_mut(buffer));
            w.acc.mma(w.a.buffer(buffer), w.b.buffer(buffer), self.mma_k);
        }
    }
}
