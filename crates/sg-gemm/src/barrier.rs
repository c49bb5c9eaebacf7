/// Group-wide barrier for workers executed in lockstep.
///
/// Every worker of the group must `arrive` before `wait` may return; a
/// missing or repeated arrival is a fatal scheduling bug.
#[derive(Debug)]
pub struct GroupBarrier {
    arrived: Vec<bool>,
    pending: usize,
    generation: u64,
}

impl GroupBarrier {
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "a barrier needs at least one worker");
        GroupBarrier {
            arrived: vec![false; workers],
            pending: workers,
            generation: 0,
        }
    }

    pub fn workers(&self) -> usize {
        self.arrived.len()
    }

    /// Record that `worker` reached the barrier.
    pub fn arrive(&mut self, worker: usize) {
        assert!(
            !self.arrived[worker],
            "worker {worker} arrived twice at barrier generation {}",
            self.generation
        );
        self.arrived[worker] = true;
        self.pending -= 1;
    }

    /// Release the group. Returns the generation that just completed.
    pub fn wait(&mut self) -> u64 {
        assert_eq!(
            self.pending, 0,
            "barrier released with {} workers still outstanding",
            self.pending
        );
        self.arrived.iter_mut().for_each(|a| *a = false);
        self.pending = self.arrived.len();
        self.generation += 1;
        self.generation - 1
    }

    /// Every worker arrives, then the group is released.
    pub fn sync_all(&mut self) -> u64 {
        for worker in 0..self.workers() {
            self.arrive(worker);
        }
        self.wait()
    }

    /// Number of completed barrier phases.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_all_counts_generations() {
        let mut b = GroupBarrier::new(4);
        assert_eq!(b.sync_all(), 0);
        assert_eq!(b.sync_all(), 1);
        assert_eq!(b.generation(), 2);
    }

    #[test]
    #[should_panic(expected = "still outstanding")]
    fn test_wait_before_all_arrive() {
        let mut b = GroupBarrier::new(2);
        b.arrive(0);
        b.wait();
    }

    #[test]
    #[should_panic(expected = "arrived twice")]
    fn test_double_arrival() {
        let mut b = GroupBarrier::new(2);
        b.arrive(1);
        b.arrive(1);
    }
}
