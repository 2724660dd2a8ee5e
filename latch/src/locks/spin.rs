//! Test-and-set spin lock.
//!
//! The lock state is a single atomic flag. Acquiring swaps `true` in and
//! succeeds if the previous value was `false`. While the lock is held,
//! waiters only read the flag (test-and-test-and-set) and back off between
//! reads, so a contended lock does not hammer the cache line with writes.
//!
//! There is no queue: waiters are not served in order and a waiter may starve.
//! The lock is not reentrant either, locking it twice from the same context deadlocks.
//!
//! ```rust
//! # use latch::locks::spin::SpinLock;
//! # use latch::locks::Spin;
//! #
//! let lock = SpinLock::<u32>::new(0); // `Spin` is used
//! let lock = SpinLock::<_, Spin>::new(0_u32); // `T` is inferred
//! ```
//!
//! # Example
//!
//! ```rust
//! # use latch::locks::spin::SpinLock;
//! let lock = SpinLock::<u8>::new(0);
//!
//! let res = lock.with_locked(|value| {
//!     *value = 42;
//!     *value
//! });
//! assert_eq!(res, 42);
//!
//! let guard = lock.lock();
//! assert!(lock.try_lock().is_none());
//! drop(guard);
//! assert!(lock.try_lock().is_some());
//! ```

use super::{BackOff, Spin};
use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// A test-and-set spin lock protecting a value of type `T`.
pub struct SpinLock<T, B: BackOff = Spin> {
    /// Whether the lock is currently held.
    locked: AtomicBool,
    /// Data protected by the lock.
    data: UnsafeCell<T>,
    /// Back-off strategy.
    _back_off: PhantomData<B>,
}

// Safety:
// The flag serializes every access to `data`.
unsafe impl<T: Send, B: BackOff> Send for SpinLock<T, B> {}
unsafe impl<T: Send, B: BackOff> Sync for SpinLock<T, B> {}

impl<T: Default, B: BackOff> Default for SpinLock<T, B> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, B: BackOff> SpinLock<T, B> {
    #[must_use]
    #[inline]
    /// Creates a new, unlocked, spin lock.
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
            _back_off: PhantomData,
        }
    }

    #[must_use]
    /// Locks the spin lock and returns a guard.
    ///
    /// For single operations, prefer `with_locked`.
    pub fn lock(&self) -> SpinGuard<'_, T, B> {
        while self.locked.swap(true, Ordering::Acquire) {
            while self.locked.load(Ordering::Relaxed) {
                B::back_off();
            }
        }

        SpinGuard { lock: self }
    }

    #[must_use]
    /// Tries to lock the spin lock and returns a guard.
    /// If it is already held, returns `None` without waiting.
    pub fn try_lock(&self) -> Option<SpinGuard<'_, T, B>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;

        Some(SpinGuard { lock: self })
    }

    #[inline]
    /// Locks the lock and calls the closure with the guarded value.
    pub fn with_locked<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    #[inline]
    /// Tries to lock the lock and calls the closure with the guarded value.
    pub fn try_with_locked<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.try_lock()?;
        Some(f(&mut guard))
    }

    #[must_use]
    #[inline]
    /// Returns true if the lock is currently held.
    ///
    /// The answer may already be stale when the caller reads it.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    #[must_use]
    #[inline]
    /// Returns a mutable reference to the data.
    ///
    /// No locking is needed: the exclusive borrow proves nobody else holds the lock.
    pub const fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    #[must_use]
    #[inline]
    /// Consume the lock and returns the inner data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    #[inline]
    /// Unlocks the spin lock.
    ///
    /// # Safety
    ///
    /// The caller must be the owner of the lock.
    unsafe fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// RAII guard for the spin lock.
///
/// The lock is released when the guard is dropped.
pub struct SpinGuard<'l, T, B: BackOff = Spin> {
    lock: &'l SpinLock<T, B>,
}

impl<T, B: BackOff> Deref for SpinGuard<'_, T, B> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // Safety: If the guard exists, we have the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T, B: BackOff> DerefMut for SpinGuard<'_, T, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // Safety: If the guard exists, we have the lock.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T, B: BackOff> Drop for SpinGuard<'_, T, B> {
    #[inline]
    fn drop(&mut self) {
        // Safety: If the guard exists, we have the lock.
        unsafe { self.lock.unlock() };
    }
}
