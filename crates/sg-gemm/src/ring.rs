/// An index into a fixed-size ring of slots.
///
/// All wrap-around arithmetic for the staging pipeline goes through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingIndex {
    value: usize,
    len: usize,
}

impl RingIndex {
    /// Index `start` in a ring of `len` slots.
    ///
    /// # Panics
    /// Panics if `len == 0` or `start >= len`.
    pub fn new(start: usize, len: usize) -> Self {
        assert!(start < len, "ring index {start} out of range for {len} slots");
        RingIndex { value: start, len }
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.value
    }

    /// Step forward one slot, wrapping to zero after the last.
    #[inline]
    pub fn advance(&mut self) {
        self.value += 1;
        if self.value == self.len {
            self.value = 0;
        }
    }

    /// The slot `steps` positions ahead, without moving.
    pub fn peek(&self, steps: usize) -> usize {
        (self.value + steps % self.len) % self.len
    }

    /// Forward distance from `self` to `other` around the ring.
    pub fn distance_to(&self, other: &RingIndex) -> usize {
        debug_assert_eq!(self.len, other.len);
        (other.value + self.len - self.value) % self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps() {
        let mut r = RingIndex::new(1, 3);
        r.advance();
        assert_eq!(r.get(), 2);
        r.advance();
        assert_eq!(r.get(), 0);
    }

    #[test]
    fn test_single_slot_ring() {
        let mut r = RingIndex::new(0, 1);
        r.advance();
        assert_eq!(r.get(), 0);
    }

    #[test]
    fn test_peek_and_distance() {
        let r = RingIndex::new(2, 4);
        assert_eq!(r.peek(3), 1);
        assert_eq!(r.peek(9), 3);
        let w = RingIndex::new(1, 4);
        assert_eq!(r.distance_to(&w), 3);
        assert_eq!(w.distance_to(&r), 1);
    }

    #[test]
    #[should_panic]
    fn test_start_out_of_range() {
        let _ = RingIndex::new(3, 3);
    }
}
