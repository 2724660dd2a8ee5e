//! RAII handle over an allocated block.

use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;

use crate::arena::SlotIndex;
use crate::guard::PoolLock;
use crate::pool::BlockPool;
use crate::tracker::FreeTracker;

/// A block borrowed from a `BlockPool`, freed when the handle is dropped.
///
/// The handle dereferences to the block's bytes. Its borrow of the pool keeps
/// the pool from being moved, reset or dropped while the block is in use.
///
/// ```rust
/// # use blockpool::BlockPool;
/// let pool = BlockPool::<32, 4>::new();
///
/// let mut block = pool.acquire().unwrap();
/// block[0] = 0xBA;
/// assert_eq!(pool.available(), 3);
///
/// drop(block);
/// assert_eq!(pool.available(), 4);
/// ```
pub struct PoolBlock<'p, const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    pool: &'p BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>,
    ptr: NonNull<u8>,
}

// Safety:
// The handle owns its block exclusively, and only needs a shared pool to free it.
unsafe impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> Send
    for PoolBlock<'_, BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
    BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>: Sync,
{
}
unsafe impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> Sync
    for PoolBlock<'_, BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
    BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>: Sync,
{
}

impl<'p, const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L>
    PoolBlock<'p, BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    /// Wraps a raw block back into a handle.
    ///
    /// # Safety
    ///
    /// `ptr` must have been allocated from `pool`, not freed since,
    /// and not be owned by anything else.
    pub unsafe fn from_raw(pool: &'p BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>, ptr: NonNull<u8>) -> Self {
        Self { pool, ptr }
    }

    #[must_use]
    /// Releases the block without freeing it, returning its raw pointer.
    ///
    /// The block stays allocated until it is given to `BlockPool::free`.
    pub fn into_raw(self) -> NonNull<u8> {
        ManuallyDrop::new(self).ptr
    }

    #[must_use]
    #[inline]
    pub const fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    #[must_use]
    /// Index of the block in its pool.
    pub fn slot(&self) -> SlotIndex {
        // Handles only ever hold valid block pointers.
        self.pool
            .slot_of(self.ptr.as_ptr())
            .unwrap_or_else(|err| unreachable!("pool block handle holds a foreign pointer: {err}"))
    }
}

impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> Deref
    for PoolBlock<'_, BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    type Target = [u8; BLOCK_SIZE];

    fn deref(&self) -> &Self::Target {
        // Safety: The handle owns the block, which is `BLOCK_SIZE` bytes long.
        unsafe { self.ptr.cast::<[u8; BLOCK_SIZE]>().as_ref() }
    }
}

impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> DerefMut
    for PoolBlock<'_, BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        // Safety: The handle owns the block, which is `BLOCK_SIZE` bytes long.
        unsafe { self.ptr.cast::<[u8; BLOCK_SIZE]>().as_mut() }
    }
}

impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> Drop
    for PoolBlock<'_, BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    fn drop(&mut self) {
        // Safety: The handle owns the block and is going away.
        unsafe { self.pool.free(self.ptr.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use crate::BlockPool;
    use crate::tracker::UsageMap;

    #[test]
    fn test_handle_frees_on_drop() {
        let pool = BlockPool::<16, 2, UsageMap<2>>::new();

        let mut first = pool.acquire().unwrap();
        let second = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        assert_eq!(first.slot().get(), 0);
        assert_eq!(second.slot().get(), 1);

        first.fill(0xEE);
        assert_eq!(*first, [0xEE; 16]);
        drop(first);

        let reused = pool.acquire().unwrap();
        assert_eq!(reused.slot().get(), 0);
        assert_eq!(*reused, [0; 16]);
    }

    #[test]
    fn test_into_raw() {
        let pool = BlockPool::<16, 1>::new();

        let ptr = pool.acquire().unwrap().into_raw();
        assert!(pool.is_exhausted());

        unsafe { pool.free(ptr.as_ptr()) };
        assert_eq!(pool.available(), 1);
    }
}
