//! Arena of fixed-size blocks
//!
//! The arena is the memory handed out to callers. It lives inline in the pool,
//! so a pool in a `static` has its blocks in static storage and a pool on the
//! stack has them on the stack. Blocks are word aligned and laid out back to back:
//! block `i` starts exactly `i * SIZE` bytes after the arena base.
//!
//! Block bytes sit behind `UnsafeCell`s. A caller writing into a block it owns
//! never races with the allocator, which only writes blocks that are being
//! freed or reset, and never takes a reference covering the whole arena.

use core::cell::UnsafeCell;
use core::ptr::NonNull;

use crate::error::{PoolError, Result};

/// Index of a block inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<SlotIndex> for usize {
    fn from(slot: SlotIndex) -> Self {
        slot.0
    }
}

/// A single block of `SIZE` bytes, aligned to the machine word.
#[repr(C)]
pub struct Block<const SIZE: usize> {
    _align: [usize; 0],
    bytes: UnsafeCell<[u8; SIZE]>,
}

impl<const SIZE: usize> Block<SIZE> {
    const fn zeroed() -> Self {
        Self {
            _align: [],
            bytes: UnsafeCell::new([0; SIZE]),
        }
    }
}

/// `COUNT` contiguous blocks of `SIZE` bytes.
pub struct Arena<const SIZE: usize, const COUNT: usize> {
    blocks: [Block<SIZE>; COUNT],
}

impl<const SIZE: usize, const COUNT: usize> Default for Arena<SIZE, COUNT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize, const COUNT: usize> Arena<SIZE, COUNT> {
    /// Total size of the arena, in bytes.
    pub const BYTES: usize = SIZE * COUNT;

    #[must_use]
    /// Creates a zeroed arena.
    pub const fn new() -> Self {
        Self {
            blocks: [const { Block::<SIZE>::zeroed() }; COUNT],
        }
    }

    #[must_use]
    #[inline]
    /// Address of the first byte of the arena.
    pub fn base_addr(&self) -> usize {
        self.blocks.as_ptr().addr()
    }

    #[must_use]
    #[inline]
    /// Returns true if `ptr` points anywhere inside the arena.
    pub fn contains(&self, ptr: *const u8) -> bool {
        let base = self.base_addr();
        (base..base + Self::BYTES).contains(&ptr.addr())
    }

    /// Converts a pointer into the index of the block it starts.
    ///
    /// # Errors
    ///
    /// - `PoolError::NullPointer` if `ptr` is null
    /// - `PoolError::OutOfBounds` if `ptr` is not inside the arena
    /// - `PoolError::Misaligned` if `ptr` is inside the arena but not at the start of a block
    pub fn slot_of(&self, ptr: *const u8) -> Result<SlotIndex> {
        if ptr.is_null() {
            return Err(PoolError::NullPointer);
        }
        if !self.contains(ptr) {
            return Err(PoolError::OutOfBounds);
        }

        let offset = ptr.addr() - self.base_addr();
        if !offset.is_multiple_of(SIZE) {
            return Err(PoolError::Misaligned);
        }

        Ok(SlotIndex(offset / SIZE))
    }

    #[must_use]
    #[inline]
    /// Pointer to the first byte of a block, or `None` if the index is out of range.
    pub fn block_ptr(&self, slot: SlotIndex) -> Option<NonNull<u8>> {
        let block = self.blocks.get(slot.0)?;
        NonNull::new(block.bytes.get().cast::<u8>())
    }

    /// Zeroes a single block.
    ///
    /// # Safety
    ///
    /// Nobody else may be reading or writing the block.
    pub unsafe fn zero(&self, slot: SlotIndex) {
        if let Some(block) = self.blocks.get(slot.0) {
            // Safety: Caller guarantees exclusive access to this block.
            unsafe { block.bytes.get().write_bytes(0, 1) };
        }
    }

    /// Zeroes every block.
    ///
    /// # Safety
    ///
    /// Nobody else may be reading or writing any block.
    pub unsafe fn zero_all_shared(&self) {
        for block in &self.blocks {
            // Safety: Caller guarantees exclusive access to the whole arena.
            unsafe { block.bytes.get().write_bytes(0, 1) };
        }
    }

    /// Zeroes every block.
    pub fn zero_all(&mut self) {
        for block in &mut self.blocks {
            *block.bytes.get_mut() = [0; SIZE];
        }
    }
}
