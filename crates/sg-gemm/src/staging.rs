use std::collections::VecDeque;

use crate::config::TileShape;
use crate::copy::CopyEngine;
use crate::ring::RingIndex;
use crate::stats::TransferStats;
use crate::tile_iter::KTileIterator;

/// Staging memory for one block tile of each operand, k fastest.
#[derive(Debug, Clone)]
pub struct StageBuffer {
    /// `tile.m x tile.k`
    pub a: Vec<f32>,
    /// `tile.n x tile.k`
    pub b: Vec<f32>,
}

impl StageBuffer {
    pub fn new(tile: &TileShape) -> Self {
        StageBuffer {
            a: vec![0.0; tile.m * tile.k],
            b: vec![0.0; tile.n * tile.k],
        }
    }
}

/// Lifecycle of a staging slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Free for the next transfer.
    Empty,
    /// A transfer was issued and has not been waited on.
    InFlight,
    /// The transfer completed but the group has not passed a barrier since,
    /// so other workers may not read it yet.
    Landed,
    /// Visible to every worker in the group.
    Ready,
}

#[derive(Debug, Clone, Copy)]
struct Transfer {
    slot: usize,
    k_tile: usize,
}

/// Snapshot of the pipeline's cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineCursor {
    pub read_index: usize,
    pub write_index: usize,
    pub remaining_tile_count: usize,
}

/// A fixed ring of staging slots fed by asynchronous transfers.
///
/// Transfers are fire-and-forget: `issue` only records them, and the data
/// lands in its slot when `wait_ready` retires it. Slots move
/// `Empty -> InFlight -> Landed -> Ready -> Empty`, and every transition is
/// checked.
#[derive(Debug)]
pub struct StagingPipeline<E> {
    engine: E,
    tiles: KTileIterator,
    slots: Vec<StageBuffer>,
    states: Vec<SlotState>,
    read: RingIndex,
    write: RingIndex,
    in_flight: VecDeque<Transfer>,
    prefetch_distance: usize,
    in_prologue: bool,
    stats: TransferStats,
}

impl<E: CopyEngine> StagingPipeline<E> {
    /// Allocate `stages` slots sized for `tile`.
    pub fn new(engine: E, tile: &TileShape, stages: usize, prefetch_distance: usize) -> Self {
        assert!(stages >= 2, "pipeline needs at least 2 stages, got {stages}");
        let tiles = KTileIterator::new(engine.k_tile_count());
        StagingPipeline {
            engine,
            tiles,
            slots: (0..stages).map(|_| StageBuffer::new(tile)).collect(),
            states: vec![SlotState::Empty; stages],
            read: RingIndex::new(0, stages),
            write: RingIndex::new(0, stages),
            in_flight: VecDeque::with_capacity(stages),
            prefetch_distance,
            in_prologue: false,
            stats: TransferStats::default(),
        }
    }

    pub fn stages(&self) -> usize {
        self.slots.len()
    }

    pub fn k_tile_count(&self) -> usize {
        self.tiles.count()
    }

    pub fn outstanding(&self) -> usize {
        self.in_flight.len()
    }

    pub fn slot_state(&self, slot: usize) -> SlotState {
        self.states[slot]
    }

    pub fn cursor(&self) -> PipelineCursor {
        PipelineCursor {
            read_index: self.read.get(),
            write_index: self.write.get(),
            remaining_tile_count: self.tiles.remaining(),
        }
    }

    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    /// Issue the transfers that fill the pipeline before compute starts:
    /// one per slot except one, or fewer if the reduction is shorter.
    pub fn prologue_fill(&mut self) {
        assert_eq!(self.tiles.advanced(), 0, "prologue must run before any other transfer");
        let depth = (self.stages() - 1).min(self.tiles.remaining());
        self.in_prologue = true;
        for _ in 0..depth {
            self.issue();
        }
        self.in_prologue = false;
        log::trace!(
            "prologue issued {} of {} k-tiles into {} stages",
            depth,
            self.tiles.count(),
            self.stages()
        );
    }

    /// Issue the next transfer into the write slot if tiles remain, then
    /// rotate the write index.
    pub fn advance_write(&mut self) {
        if !self.tiles.is_exhausted() {
            self.issue();
        } else {
            self.write.advance();
        }
    }

    /// Free the slot at the read index and rotate to the next one.
    pub fn advance_read(&mut self) {
        let slot = self.read.get();
        assert_eq!(
            self.states[slot],
            SlotState::Ready,
            "released staging slot {slot} that was never consumed"
        );
        self.states[slot] = SlotState::Empty;
        self.read.advance();
    }

    /// Block until at most `n` transfers remain outstanding, oldest first.
    pub fn wait_ready(&mut self, n: usize) {
        while self.in_flight.len() > n {
            let Some(transfer) = self.in_flight.pop_front() else {
                break;
            };
            self.engine
                .copy_tile(transfer.k_tile, &mut self.slots[transfer.slot]);
            self.states[transfer.slot] = SlotState::Landed;
        }
    }

    /// Transfers issued after the one feeding the read slot.
    ///
    /// Waiting with this count guarantees the read slot has landed while
    /// leaving every younger transfer in flight: `stages - 2` in steady
    /// state, fewer while the pipeline drains.
    pub fn pending_after_read(&self) -> usize {
        let slot = self.read.get();
        match self.in_flight.iter().position(|t| t.slot == slot) {
            Some(pos) => self.in_flight.len() - pos - 1,
            None => self.in_flight.len(),
        }
    }

    /// Make every landed slot visible to the whole group. Call only after a
    /// group barrier.
    pub fn publish(&mut self) {
        for state in self.states.iter_mut() {
            if *state == SlotState::Landed {
                *state = SlotState::Ready;
            }
        }
    }

    /// The staging slot under the read index.
    ///
    /// # Panics
    /// Panics if the slot's transfer has not been waited on and published.
    pub fn read_slot(&self) -> &StageBuffer {
        let slot = self.read.get();
        assert_eq!(
            self.states[slot],
            SlotState::Ready,
            "read of staging slot {slot} before its transfer was published"
        );
        &self.slots[slot]
    }

    fn issue(&mut self) {
        let slot = self.write.get();
        assert_eq!(
            self.states[slot],
            SlotState::Empty,
            "transfer issued into staging slot {slot} while it is still in use"
        );
        assert!(
            self.in_flight.len() < self.stages() - 1,
            "more than {} transfers in flight",
            self.stages() - 1
        );
        let k_tile = self.tiles.current();
        self.tiles.advance();
        self.in_flight.push_back(Transfer { slot, k_tile });
        self.states[slot] = SlotState::InFlight;
        self.write.advance();

        if self.in_prologue {
            self.stats.prologue_transfers += 1;
        } else {
            self.stats.mainloop_transfers += 1;
        }
        self.stats.max_outstanding = self.stats.max_outstanding.max(self.in_flight.len());

        if self.prefetch_distance > 0 {
            let ahead = k_tile + self.prefetch_distance;
            if ahead < self.tiles.count() {
                self.engine.prefetch(ahead);
                self.stats.prefetches += 1;
            }
        }
    }
}
