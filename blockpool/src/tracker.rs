//! Free-block tracking strategies
//!
//! A tracker knows which slots of the arena are free. It never touches the
//! blocks themselves, only slot indices. Two strategies are provided:
//!
//! - `FreeList`: a singly-linked list of free slots, O(1) allocation and deallocation.
//! - `UsageMap`: one used flag per slot plus a used counter, first-fit allocation in O(n)
//!   that short-circuits to O(1) when the pool is exhausted.
//!
//! Both detect double frees.

use crate::arena::SlotIndex;
use crate::error::Result;

mod list;
mod map;

pub use list::FreeList;
pub use map::UsageMap;

/// Bookkeeping of the free slots of an arena.
///
/// Every slot is either free or used. The set of free slots reported by a tracker
/// must always be exactly the set of slots that have not been handed out.
pub trait FreeTracker: Sized {
    /// Number of slots tracked.
    const CAPACITY: usize;

    /// Creates a tracker with every slot free.
    fn new() -> Self;

    /// Marks every slot free again.
    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Marks a free slot as used and returns it, or `None` if there is no free slot.
    fn acquire(&mut self) -> Option<SlotIndex>;

    /// Marks a used slot as free.
    ///
    /// # Errors
    ///
    /// - `PoolError::OutOfBounds` if the slot is not tracked
    /// - `PoolError::DoubleFree` if the slot is already free
    fn release(&mut self, slot: SlotIndex) -> Result<()>;

    /// Returns true if the slot is tracked and currently free.
    fn is_free(&self, slot: SlotIndex) -> bool;

    /// Number of free slots.
    fn available(&self) -> usize;

    #[inline]
    /// Returns true if no slot is free.
    fn is_exhausted(&self) -> bool {
        self.available() == 0
    }
}
