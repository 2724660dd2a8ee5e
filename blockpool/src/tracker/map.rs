use crate::arena::SlotIndex;
use crate::error::{PoolError, Result};

use super::FreeTracker;

/// Free slots kept as one used flag per slot, plus a count of used slots.
///
/// Allocation scans from slot 0 and takes the first free slot.
/// The counter lets an exhausted pool fail without scanning.
#[derive(Debug, Clone)]
pub struct UsageMap<const N: usize> {
    used: [bool; N],
    used_count: usize,
}

impl<const N: usize> Default for UsageMap<N> {
    fn default() -> Self {
        <Self as FreeTracker>::new()
    }
}

impl<const N: usize> FreeTracker for UsageMap<N> {
    const CAPACITY: usize = N;

    fn new() -> Self {
        Self {
            used: [false; N],
            used_count: 0,
        }
    }

    fn acquire(&mut self) -> Option<SlotIndex> {
        if self.used_count == N {
            return None;
        }

        let index = self.used.iter().position(|&used| !used)?;
        self.used[index] = true;
        self.used_count += 1;

        Some(SlotIndex::new(index))
    }

    fn release(&mut self, slot: SlotIndex) -> Result<()> {
        let used = self
            .used
            .get_mut(slot.get())
            .ok_or(PoolError::OutOfBounds)?;

        if !*used {
            return Err(PoolError::DoubleFree);
        }

        *used = false;
        self.used_count -= 1;

        Ok(())
    }

    #[inline]
    fn is_free(&self, slot: SlotIndex) -> bool {
        self.used.get(slot.get()).is_some_and(|&used| !used)
    }

    #[inline]
    fn available(&self) -> usize {
        N - self.used_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fit() {
        let mut map = UsageMap::<4>::new();

        for expected in 0..4 {
            assert_eq!(map.acquire(), Some(SlotIndex::new(expected)));
        }
        assert_eq!(map.acquire(), None);

        map.release(SlotIndex::new(3)).unwrap();
        map.release(SlotIndex::new(1)).unwrap();

        // Lowest free index first, whatever the release order
        assert_eq!(map.acquire(), Some(SlotIndex::new(1)));
        assert_eq!(map.acquire(), Some(SlotIndex::new(3)));
    }

    #[test]
    fn test_double_free() {
        let mut map = UsageMap::<2>::new();
        let slot = map.acquire().unwrap();

        assert_eq!(map.release(slot), Ok(()));
        assert_eq!(map.release(slot), Err(PoolError::DoubleFree));
        assert_eq!(map.available(), 2);
        assert_eq!(map.release(SlotIndex::new(1)), Err(PoolError::DoubleFree));
    }

    #[test]
    fn test_counter_tracks_flags() {
        let mut map = UsageMap::<8>::new();
        for _ in 0..5 {
            map.acquire().unwrap();
        }
        assert_eq!(map.available(), 3);
        assert_eq!(map.used.iter().filter(|&&used| used).count(), 5);
        assert!(!map.is_exhausted());
    }
}
