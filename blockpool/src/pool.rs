//! Fixed-size block pool
//!
//! `BlockPool` ties an arena, a free tracker and a lock together. Every
//! allocation and deallocation runs entirely under the lock, including the
//! paths that fail. Logging happens once the lock has been released.

use core::marker::PhantomData;
use core::ptr::NonNull;

use latch::locks::spin::SpinLock;

use crate::arena::{Arena, Block, SlotIndex};
use crate::config;
use crate::error::{PoolError, Result};
use crate::guard::PoolLock;
use crate::handle::PoolBlock;
use crate::tracker::{FreeList, FreeTracker};

/// A pool of `BLOCK_COUNT` blocks of `BLOCK_SIZE` bytes.
///
/// The free-block tracking strategy (`T`) and the lock (`L`) are chosen at build time.
/// Both geometry parameters default to the values of `crate::config`.
///
/// Pointers handed out by the pool point into the pool itself: the pool must not be
/// moved or dropped while blocks are in use. `PoolBlock` handles enforce this through
/// their borrow, raw pointers leave it to the caller.
///
/// Invalid geometries are rejected when the pool type is instantiated:
///
/// ```compile_fail
/// // Block size not a multiple of the block alignment
/// let pool = blockpool::BlockPool::<6, 10>::new();
/// ```
///
/// ```compile_fail
/// // No blocks at all
/// let pool = blockpool::BlockPool::<32, 0, blockpool::UsageMap<0>>::new();
/// ```
///
/// ```compile_fail
/// // Tracker sized for another pool
/// let pool = blockpool::BlockPool::<32, 10, blockpool::UsageMap<8>>::new();
/// ```
pub struct BlockPool<
    const BLOCK_SIZE: usize = { config::BLOCK_SIZE },
    const BLOCK_COUNT: usize = { config::BLOCK_COUNT },
    T: FreeTracker = FreeList<BLOCK_COUNT>,
    L: PoolLock<T> = SpinLock<T>,
> {
    /// Memory handed out to callers
    arena: Arena<BLOCK_SIZE, BLOCK_COUNT>,
    /// Free tracker, only reachable through the lock
    tracker: L,
    _tracker: PhantomData<T>,
}

// Safety:
// The tracker is only accessed through the lock.
// The pool writes into a block only when it is being freed (ownership is given back
// by the caller) or on a reset that requires no block to be in use.
// Used blocks are only ever accessed by the caller that owns them.
unsafe impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> Sync
    for BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker + Send,
    L: PoolLock<T> + Sync,
{
}

impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> Default
    for BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    /// Rejects invalid geometries when the pool type is instantiated.
    const GEOMETRY_CHECK: () = {
        assert!(BLOCK_SIZE > 0, "block size must be positive");
        assert!(
            BLOCK_SIZE.is_multiple_of(config::BLOCK_ALIGN),
            "block size must be a multiple of the block alignment"
        );
        assert!(BLOCK_COUNT > 0, "block count must be positive");
        assert!(
            T::CAPACITY == BLOCK_COUNT,
            "tracker capacity must match the block count"
        );
        assert!(
            size_of::<Block<BLOCK_SIZE>>() == BLOCK_SIZE,
            "blocks must be laid out back to back"
        );
    };

    #[must_use]
    /// Creates a pool with a zeroed arena, every block free and the lock released.
    pub fn new() -> Self {
        let () = Self::GEOMETRY_CHECK;

        Self {
            arena: Arena::new(),
            tracker: L::new(T::new()),
            _tracker: PhantomData,
        }
    }

    /// Brings the pool back to the state `new` creates.
    ///
    /// Every pointer handed out before the reset becomes free memory of the pool.
    pub fn reset(&mut self) {
        self.arena.zero_all();
        self.tracker.get_mut().reset();
    }

    /// Brings the pool back to the state `new` creates, through a shared reference.
    ///
    /// # Safety
    ///
    /// No block may be in use: nobody may be reading or writing a block
    /// handed out by this pool, during the reset or after it.
    pub unsafe fn reset_shared(&self) {
        self.tracker.with_locked(|tracker| {
            // Safety: Caller guarantees no block is in use.
            unsafe { self.arena.zero_all_shared() };
            tracker.reset();
        });
    }

    #[must_use]
    #[inline]
    /// Number of blocks in the pool.
    pub const fn capacity(&self) -> usize {
        BLOCK_COUNT
    }

    #[must_use]
    #[inline]
    /// Size of every block, in bytes.
    pub const fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    #[must_use]
    /// Number of blocks that can currently be allocated.
    pub fn available(&self) -> usize {
        self.tracker.with_locked(|tracker| tracker.available())
    }

    #[must_use]
    /// Returns true if every block is in use.
    pub fn is_exhausted(&self) -> bool {
        self.tracker.with_locked(|tracker| tracker.is_exhausted())
    }

    #[must_use]
    #[inline]
    /// Returns true if `ptr` points inside the pool's arena.
    pub fn contains(&self, ptr: *const u8) -> bool {
        self.arena.contains(ptr)
    }

    /// Index of the block `ptr` points to.
    ///
    /// # Errors
    ///
    /// - `PoolError::NullPointer` if `ptr` is null
    /// - `PoolError::OutOfBounds` if `ptr` is outside of the arena
    /// - `PoolError::Misaligned` if `ptr` does not point to the start of a block
    pub fn slot_of(&self, ptr: *const u8) -> Result<SlotIndex> {
        self.arena.slot_of(ptr)
    }

    #[must_use]
    #[inline]
    /// Pointer to the start of a block, or `None` if the index is out of range.
    pub fn block_ptr(&self, slot: SlotIndex) -> Option<NonNull<u8>> {
        self.arena.block_ptr(slot)
    }

    /// Allocates a block.
    ///
    /// The block is `BLOCK_SIZE` bytes long, word aligned, and reads as zeroes.
    ///
    /// # Errors
    ///
    /// - `PoolError::Exhausted` if every block is in use
    pub fn try_allocate(&self) -> Result<NonNull<u8>> {
        let slot = self.tracker.with_locked(T::acquire);

        let Some(slot) = slot else {
            tracing::debug!(capacity = BLOCK_COUNT, "block pool exhausted");
            return Err(PoolError::Exhausted);
        };

        let Some(ptr) = self.arena.block_ptr(slot) else {
            unreachable!("tracker handed out {slot:?}, past the end of the arena");
        };

        tracing::trace!(slot = slot.get(), "block allocated");
        Ok(ptr)
    }

    #[must_use]
    /// Allocates a block, returning `None` when the pool is exhausted.
    ///
    /// See `try_allocate`.
    pub fn allocate(&self) -> Option<NonNull<u8>> {
        self.try_allocate().ok()
    }

    #[must_use]
    /// Allocates a block wrapped in a handle that frees it on drop.
    pub fn acquire(&self) -> Option<PoolBlock<'_, BLOCK_SIZE, BLOCK_COUNT, T, L>> {
        let ptr = self.allocate()?;
        // Safety: `ptr` was just allocated from this pool and is owned by no one else.
        Some(unsafe { PoolBlock::from_raw(self, ptr) })
    }

    /// Frees a block, reporting why the pointer was rejected if it was.
    ///
    /// The block is zeroed before it becomes available again.
    /// A rejected pointer leaves the pool untouched.
    ///
    /// # Safety
    ///
    /// If `ptr` points to the start of a block that is in use, the caller must own that block:
    /// it was returned by this pool's allocation functions and has not been freed since.
    /// The caller must not access the block afterwards.
    ///
    /// # Errors
    ///
    /// - `PoolError::NullPointer` if `ptr` is null
    /// - `PoolError::OutOfBounds` if `ptr` is outside of the arena
    /// - `PoolError::Misaligned` if `ptr` does not point to the start of a block
    /// - `PoolError::DoubleFree` if the block is already free
    pub unsafe fn try_free(&self, ptr: *mut u8) -> Result<()> {
        let freed = self.tracker.with_locked(|tracker: &mut T| -> Result<SlotIndex> {
            let slot = self.arena.slot_of(ptr)?;
            if tracker.is_free(slot) {
                return Err(PoolError::DoubleFree);
            }

            // Safety: The block is in use, so caller owns it and gives it back.
            unsafe { self.arena.zero(slot) };
            tracker.release(slot)?;

            Ok(slot)
        });

        match freed {
            Ok(slot) => {
                tracing::trace!(slot = slot.get(), "block freed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, ptr = ?ptr, "rejected block free");
                Err(err)
            }
        }
    }

    /// Frees a block, silently ignoring invalid pointers.
    ///
    /// See `try_free`.
    ///
    /// # Safety
    ///
    /// Same as `try_free`.
    pub unsafe fn free(&self, ptr: *mut u8) {
        // Safety: Forwarded to the caller.
        let _ = unsafe { self.try_free(ptr) };
    }
}
