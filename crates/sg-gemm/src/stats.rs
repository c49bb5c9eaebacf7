use std::fmt;

/// Counters kept by the staging pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub prologue_transfers: usize,
    pub mainloop_transfers: usize,
    /// Highest number of transfers in flight at once.
    pub max_outstanding: usize,
    pub prefetches: usize,
}

impl TransferStats {
    pub fn transfers_issued(&self) -> usize {
        self.prologue_transfers + self.mainloop_transfers
    }
}

/// What one pipeline run (or a whole launch, when merged) did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub k_tiles: usize,
    pub transfers: TransferStats,
    pub barriers: u64,
    /// Sub-block loads from staging into registers, per group.
    pub register_loads: usize,
    /// Multiply-accumulate steps, per group.
    pub mma_steps: usize,
}

impl PipelineStats {
    /// Fold another run into this one. Counts add up; `max_outstanding`
    /// keeps the maximum.
    pub fn merge(&mut self, other: &PipelineStats) {
        self.k_tiles += other.k_tiles;
        self.transfers.prologue_transfers += other.transfers.prologue_transfers;
        self.transfers.mainloop_transfers += other.transfers.mainloop_transfers;
        self.transfers.max_outstanding = self.transfers.max_outstanding.max(other.transfers.max_outstanding);
        self.transfers.prefetches += other.transfers.prefetches;
        self.barriers += other.barriers;
        self.register_loads += other.register_loads;
        self.mma_steps += other.mma_steps;
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} k-tiles, {} transfers ({} prologue), max {} in flight, {} barriers, {} mma steps",
            self.k_tiles,
            self.transfers.transfers_issued(),
            self.transfers.prologue_transfers,
            self.transfers.max_outstanding,
            self.barriers,
            self.mma_steps
        )
    }
}
