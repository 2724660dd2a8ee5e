//! Mutual exclusion around the free-block tracker.
//!
//! The pool is generic over the lock that serializes allocations and
//! deallocations. On bare metal, the default `latch` spin lock busy-waits.
//! With the `std` feature, `parking_lot::Mutex` parks waiting threads instead,
//! which is the better fit when an OS scheduler can preempt the lock holder.
//!
//! Critical sections are a handful of index updates and at most one block
//! zeroing, so the choice of lock does not change the pool's latency profile.
//! No lock here is reentrant.

use latch::locks::BackOff;
use latch::locks::spin::SpinLock;

/// A lock owning a value of type `T`.
pub trait PoolLock<T> {
    /// Wraps a value in a new, unlocked, lock.
    fn new(value: T) -> Self;

    /// Locks, calls the closure with the guarded value, then unlocks.
    fn with_locked<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;

    /// Returns a mutable reference to the value without locking.
    fn get_mut(&mut self) -> &mut T;
}

impl<T, B: BackOff> PoolLock<T> for SpinLock<T, B> {
    #[inline]
    fn new(value: T) -> Self {
        Self::new(value)
    }

    #[inline]
    fn with_locked<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        Self::with_locked(self, f)
    }

    #[inline]
    fn get_mut(&mut self) -> &mut T {
        Self::get_mut(self)
    }
}

#[cfg(feature = "std")]
impl<T> PoolLock<T> for parking_lot::Mutex<T> {
    #[inline]
    fn new(value: T) -> Self {
        Self::new(value)
    }

    #[inline]
    fn with_locked<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.lock())
    }

    #[inline]
    fn get_mut(&mut self) -> &mut T {
        Self::get_mut(self)
    }
}
