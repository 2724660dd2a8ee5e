//! Concurrent use of a single pool from several threads

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread::spawn;

use blockpool::{BlockPool, FreeTracker, PoolLock, UsageMap};

const NB_THREADS: usize = 8;

/// Threads race to drain the pool: every block is handed out exactly once.
fn check_concurrent_drain<T, L>(pool: BlockPool<16, 64, T, L>)
where
    T: FreeTracker + Send + 'static,
    L: PoolLock<T> + Send + Sync + 'static,
{
    let pool = Arc::new(pool);
    let barrier = Arc::new(Barrier::new(NB_THREADS));

    let handles: Vec<_> = (0..NB_THREADS)
        .map(|_| {
            let pool = pool.clone();
            let barrier = barrier.clone();
            spawn(move || {
                barrier.wait();
                core::iter::from_fn(|| pool.allocate())
                    .map(|ptr| ptr.as_ptr().addr())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for addr in handle.join().unwrap() {
            assert!(seen.insert(addr), "block {addr:#x} handed out twice");
        }
    }

    assert_eq!(seen.len(), 64);
    assert!(pool.is_exhausted());
}

#[test]
fn test_concurrent_drain() {
    check_concurrent_drain(BlockPool::<16, 64>::new());
    check_concurrent_drain(BlockPool::<16, 64, UsageMap<64>>::new());
}

/// Threads allocate, stamp, check and free blocks in a loop.
/// A block shared by two threads would show the other thread's stamp.
fn check_concurrent_churn<T, L>(pool: BlockPool<16, 8, T, L>)
where
    T: FreeTracker + Send + 'static,
    L: PoolLock<T> + Send + Sync + 'static,
{
    let pool = Arc::new(pool);
    let barrier = Arc::new(Barrier::new(NB_THREADS));

    let handles: Vec<_> = (0..NB_THREADS)
        .map(|id| {
            let pool = pool.clone();
            let barrier = barrier.clone();
            let stamp = u8::try_from(id + 1).unwrap();
            spawn(move || {
                barrier.wait();
                for _ in 0..2_000 {
                    let Some(mut block) = pool.acquire() else {
                        continue;
                    };
                    assert_eq!(*block, [0; 16], "allocated block is not zeroed");
                    block.fill(stamp);
                    std::hint::spin_loop();
                    assert_eq!(*block, [stamp; 16], "block shared between threads");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(pool.available(), 8);
}

#[test]
fn test_concurrent_churn() {
    check_concurrent_churn(BlockPool::<16, 8>::new());
    check_concurrent_churn(BlockPool::<16, 8, UsageMap<8>>::new());
}

#[cfg(feature = "std")]
#[test]
fn test_concurrent_churn_mutex() {
    use blockpool::MutexPool;

    check_concurrent_churn(MutexPool::<16, 8>::new());
    check_concurrent_churn(MutexPool::<16, 8, UsageMap<8>>::new());
}

#[cfg(feature = "std")]
#[test]
fn test_concurrent_churn_yielding_spin_lock() {
    use blockpool::FreeList;
    use latch::locks::Yield;
    use latch::locks::spin::SpinLock;

    type YieldLock<T> = SpinLock<T, Yield>;

    check_concurrent_drain(BlockPool::<16, 64, FreeList<64>, YieldLock<FreeList<64>>>::new());
    check_concurrent_churn(BlockPool::<16, 8, FreeList<8>, YieldLock<FreeList<8>>>::new());
    check_concurrent_churn(BlockPool::<16, 8, UsageMap<8>, YieldLock<UsageMap<8>>>::new());
}
