use crate::arena::SlotIndex;
use crate::error::{PoolError, Result};

use super::FreeTracker;

/// State of a single slot.
///
/// The link to the next free slot only exists while the slot is free,
/// and lives here rather than in the block's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free { next: Option<SlotIndex> },
    Used,
}

/// Free slots kept in a singly-linked list.
///
/// Allocation pops the head and deallocation pushes onto it, both in O(1).
/// A fresh list hands slots out in ascending order.
#[derive(Debug, Clone)]
pub struct FreeList<const N: usize> {
    /// Head of the free list
    head: Option<SlotIndex>,
    /// Per-slot state, holding the links
    slots: [SlotState; N],
    /// Number of free slots
    free_count: usize,
}

impl<const N: usize> Default for FreeList<N> {
    fn default() -> Self {
        <Self as FreeTracker>::new()
    }
}

impl<const N: usize> FreeTracker for FreeList<N> {
    const CAPACITY: usize = N;

    fn new() -> Self {
        Self {
            head: (N > 0).then_some(SlotIndex::new(0)),
            slots: core::array::from_fn(|i| SlotState::Free {
                next: (i + 1 < N).then_some(SlotIndex::new(i + 1)),
            }),
            free_count: N,
        }
    }

    fn acquire(&mut self) -> Option<SlotIndex> {
        let slot = self.head?;
        let state = &mut self.slots[slot.get()];

        let SlotState::Free { next } = *state else {
            unreachable!("free list head {slot:?} is in use");
        };

        *state = SlotState::Used;
        self.head = next;
        self.free_count -= 1;

        Some(slot)
    }

    fn release(&mut self, slot: SlotIndex) -> Result<()> {
        let state = self
            .slots
            .get_mut(slot.get())
            .ok_or(PoolError::OutOfBounds)?;

        if matches!(state, SlotState::Free { .. }) {
            return Err(PoolError::DoubleFree);
        }

        *state = SlotState::Free { next: self.head };
        self.head = Some(slot);
        self.free_count += 1;

        Ok(())
    }

    #[inline]
    fn is_free(&self, slot: SlotIndex) -> bool {
        matches!(self.slots.get(slot.get()), Some(SlotState::Free { .. }))
    }

    #[inline]
    fn available(&self) -> usize {
        self.free_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_then_lifo() {
        let mut list = FreeList::<4>::new();

        let slots: Vec<_> = (0..4).map(|_| list.acquire().unwrap().get()).collect();
        assert_eq!(slots, [0, 1, 2, 3]);
        assert_eq!(list.acquire(), None);

        list.release(SlotIndex::new(2)).unwrap();
        list.release(SlotIndex::new(0)).unwrap();

        // Last freed, first reused
        assert_eq!(list.acquire(), Some(SlotIndex::new(0)));
        assert_eq!(list.acquire(), Some(SlotIndex::new(2)));
        assert_eq!(list.acquire(), None);
    }

    #[test]
    fn test_double_free_keeps_list_intact() {
        let mut list = FreeList::<3>::new();
        let slot = list.acquire().unwrap();

        assert_eq!(list.release(slot), Ok(()));
        assert_eq!(list.release(slot), Err(PoolError::DoubleFree));
        assert_eq!(list.available(), 3);

        // A corrupted list would hand the same slot out twice here.
        let mut seen: Vec<_> = (0..3).map(|_| list.acquire().unwrap().get()).collect();
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2]);
        assert!(list.is_exhausted());
    }

    #[test]
    fn test_release_out_of_range() {
        let mut list = FreeList::<2>::new();
        assert_eq!(list.release(SlotIndex::new(2)), Err(PoolError::OutOfBounds));
        assert!(!list.is_free(SlotIndex::new(2)));
    }
}
