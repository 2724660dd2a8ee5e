//! # Blockpool: Fixed-Size Block Allocator for Heapless Targets
//!
//! Blockpool hands out and reclaims blocks of a single size from an arena of
//! fixed capacity. It never grows, never calls into a system allocator, and
//! fits targets without a heap: bare metal, RTOS tasks, early boot code.
//!
//! ## Architecture
//!
//! A `BlockPool` is made of three parts:
//! - **Arena**: `BLOCK_COUNT` word-aligned blocks of `BLOCK_SIZE` bytes, stored inline
//! - **Free tracker**: which blocks are free, chosen at build time
//!   - `FreeList`: O(1) allocation and deallocation, last freed block reused first
//!   - `UsageMap`: first-fit allocation in O(n), O(1) failure on an exhausted pool
//! - **Lock**: serializes every allocation and deallocation
//!   - `latch` spin lock by default
//!   - `parking_lot::Mutex` with the `std` feature
//!
//! Allocated blocks always read as zeroes: the arena starts zeroed and
//! every block is zeroed when it is freed.
//!
//! Freeing validates the pointer first. Null pointers, pointers outside the
//! arena, pointers that are not at the start of a block and blocks that are
//! already free are rejected without touching the pool.
//!
//! ## Usage
//!
//! ```rust
//! use blockpool::{BlockPool, PoolError};
//!
//! // 10 blocks of 32 bytes
//! let pool = BlockPool::<32, 10>::new();
//!
//! let block = pool.allocate().unwrap();
//! unsafe { block.as_ptr().write(0xBA) };
//!
//! // Pointers that are not blocks of this pool are refused
//! let misaligned = block.as_ptr().wrapping_add(1);
//! assert_eq!(unsafe { pool.try_free(misaligned) }, Err(PoolError::Misaligned));
//!
//! unsafe { pool.free(block.as_ptr()) };
//! assert_eq!(pool.available(), 10);
//! ```
//!
//! Handles free their block automatically:
//!
//! ```rust
//! use blockpool::{BlockPool, UsageMap};
//!
//! let pool = BlockPool::<64, 4, UsageMap<4>>::new();
//! {
//!     let mut block = pool.acquire().unwrap();
//!     block[..5].copy_from_slice(b"hello");
//! }
//! assert!(pool.acquire().unwrap().iter().all(|&byte| byte == 0));
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]

mod arena;
pub mod config;
mod error;
mod global;
mod guard;
mod handle;
mod pool;
mod tracker;

// Public exports
pub use arena::SlotIndex;
pub use error::{PoolError, Result};
pub use global::StaticPool;
pub use guard::PoolLock;
pub use handle::PoolBlock;
pub use pool::BlockPool;
pub use tracker::{FreeList, FreeTracker, UsageMap};

/// A pool guarded by a blocking OS mutex instead of a spin lock.
#[cfg(feature = "std")]
pub type MutexPool<
    const BLOCK_SIZE: usize = { config::BLOCK_SIZE },
    const BLOCK_COUNT: usize = { config::BLOCK_COUNT },
    T = FreeList<BLOCK_COUNT>,
> = BlockPool<BLOCK_SIZE, BLOCK_COUNT, T, parking_lot::Mutex<T>>;
