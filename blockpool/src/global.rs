//! Pool living in a `static`.
//!
//! ```rust
//! # use blockpool::StaticPool;
//! static POOL: StaticPool = StaticPool::uninit();
//!
//! assert!(POOL.allocate().is_none());
//! POOL.init();
//!
//! let block = POOL.allocate().unwrap();
//! unsafe { POOL.free(block.as_ptr()) };
//! ```

use core::ptr::NonNull;

use latch::locks::spin::SpinLock;
use latch::once::Once;

use crate::config;
use crate::guard::PoolLock;
use crate::pool::BlockPool;
use crate::tracker::{FreeList, FreeTracker};

/// A `BlockPool` that can be declared as a `static` and initialized later.
///
/// Until `init` is called, allocations fail and frees do nothing.
pub struct StaticPool<
    const BLOCK_SIZE: usize = { config::BLOCK_SIZE },
    const BLOCK_COUNT: usize = { config::BLOCK_COUNT },
    T: FreeTracker = FreeList<BLOCK_COUNT>,
    L: PoolLock<T> = SpinLock<T>,
> {
    pool: Once<BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>>,
}

impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> Default
    for StaticPool<BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    fn default() -> Self {
        Self::uninit()
    }
}

impl<const BLOCK_SIZE: usize, const BLOCK_COUNT: usize, T, L> StaticPool<BLOCK_SIZE, BLOCK_COUNT, T, L>
where
    T: FreeTracker,
    L: PoolLock<T>,
{
    #[must_use]
    pub const fn uninit() -> Self {
        Self {
            pool: Once::uninit(),
        }
    }

    /// Initializes the pool if it has not been initialized yet, and returns it.
    ///
    /// Calling it again is harmless and leaves the pool as it is.
    pub fn init(&self) -> &BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L> {
        self.pool.call_once(BlockPool::new)
    }

    /// Initializes the pool, or brings it back to its initial state if it already was.
    ///
    /// # Safety
    ///
    /// No block of this pool may be in use, during the reset or after it.
    pub unsafe fn reinit(&self) -> &BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L> {
        let pool = self.init();
        // Safety: Forwarded to the caller.
        unsafe { pool.reset_shared() };
        pool
    }

    #[must_use]
    #[inline]
    /// Returns the pool, if it is initialized.
    pub fn get(&self) -> Option<&BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, L>> {
        self.pool.get()
    }

    #[must_use]
    /// Allocates a block, returning `None` if the pool is exhausted or not initialized.
    pub fn allocate(&self) -> Option<NonNull<u8>> {
        self.get()?.allocate()
    }

    /// Frees a block, silently ignoring invalid pointers and uninitialized pools.
    ///
    /// # Safety
    ///
    /// Same as `BlockPool::free`.
    pub unsafe fn free(&self, ptr: *mut u8) {
        if let Some(pool) = self.get() {
            // Safety: Forwarded to the caller.
            unsafe { pool.free(ptr) };
        }
    }
}
