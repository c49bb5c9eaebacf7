/// Finite, single-pass cursor over reduction-dimension tile coordinates.
///
/// `current` reads the next coordinate without moving; `advance` moves on.
/// There is no way to rewind, and advancing past the end is a programming
/// error.
#[derive(Debug)]
pub struct KTileIterator {
    next: usize,
    count: usize,
}

impl KTileIterator {
    pub fn new(count: usize) -> Self {
        KTileIterator { next: 0, count }
    }

    /// The k-tile coordinate the next transfer will read.
    ///
    /// # Panics
    /// Panics if the iterator is exhausted.
    pub fn current(&self) -> usize {
        assert!(
            self.next < self.count,
            "k-tile iterator dereferenced past its {} tiles",
            self.count
        );
        self.next
    }

    /// Move to the following coordinate.
    ///
    /// # Panics
    /// Panics if the iterator is already exhausted.
    pub fn advance(&mut self) {
        assert!(
            self.next < self.count,
            "k-tile iterator advanced past its {} tiles",
            self.count
        );
        self.next += 1;
    }

    pub fn remaining(&self) -> usize {
        self.count - self.next
    }

    /// How many times `advance` has been called.
    pub fn advanced(&self) -> usize {
        self.next
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_exhausted(&self) -> bool {
        self.next == self.count
    }
}
