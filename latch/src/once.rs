//! One-time initialization cell usable in `static`s.
//!
//! `Once` does not provide interior mutability: it runs an initializer
//! exactly once and then hands out shared references to the result.
//! Wrap the value in a lock if it must be mutated afterwards.
//!
//! ## Examples
//!
//! ```rust
//! # use latch::once::Once;
//! #
//! static ONCE: Once<u8> = Once::uninit();
//! assert!(ONCE.get().is_none());
//!
//! let value = ONCE.call_once(|| 42);
//! assert_eq!(*value, 42);
//!
//! // Later initializers are ignored.
//! assert_eq!(*ONCE.call_once(|| 0), 42);
//! ```
use crate::locks::{BackOff, Spin};
use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const INITIALIZED: u8 = 2;

/// A cell that is written once, then only read.
pub struct Once<T, B: BackOff = Spin> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
    _back_off: PhantomData<B>,
}

// Safety:
// Only shared references are handed out, and only once `state` is `INITIALIZED`.
// The single writer is elected through `state`.
unsafe impl<T: Send, B: BackOff> Send for Once<T, B> {}
unsafe impl<T: Send + Sync, B: BackOff> Sync for Once<T, B> {}

impl<T, B: BackOff> Default for Once<T, B> {
    fn default() -> Self {
        Self::uninit()
    }
}

impl<T, B: BackOff> Once<T, B> {
    #[must_use]
    #[inline]
    pub const fn uninit() -> Self {
        Self {
            state: AtomicU8::new(UNINITIALIZED),
            value: UnsafeCell::new(MaybeUninit::uninit()),
            _back_off: PhantomData,
        }
    }

    #[must_use]
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Acquire) == INITIALIZED
    }

    /// Initializes the value if it has not been initialized yet, then returns it.
    ///
    /// If another thread is running its initializer, waits for it to finish.
    /// The initializer must not panic: waiters would spin forever.
    pub fn call_once<F>(&self, initializer: F) -> &T
    where
        F: FnOnce() -> T,
    {
        if self
            .state
            .compare_exchange(
                UNINITIALIZED,
                INITIALIZING,
                Ordering::Acquire,
                Ordering::Acquire,
            )
            .is_ok()
        {
            let initialized_value = initializer();

            // Safety:
            // Winning the exchange makes us the only thread touching the value.
            unsafe { (*self.value.get()).write(initialized_value) };

            self.state.store(INITIALIZED, Ordering::Release);
        }

        self.wait()
    }

    #[must_use]
    /// Returns the value, or `None` if no initializer has been started yet.
    ///
    /// An initialization in progress is waited for.
    pub fn get(&self) -> Option<&T> {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => None,
            _ => Some(self.wait()),
        }
    }

    fn wait(&self) -> &T {
        while self.state.load(Ordering::Acquire) != INITIALIZED {
            B::back_off();
        }
        // Safety:
        // The value is initialized and never written again.
        unsafe { (*self.value.get()).assume_init_ref() }
    }
}

impl<T, B: BackOff> Drop for Once<T, B> {
    fn drop(&mut self) {
        if *self.state.get_mut() == INITIALIZED {
            // Safety:
            // We have exclusive access and the value is initialized.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread::spawn;

    #[test]
    fn test_once() {
        let once = Once::<_>::uninit();
        assert!(once.get().is_none());
        assert!(!once.is_initialized());

        once.call_once(|| 42);

        assert!(once.is_initialized());
        assert_eq!(once.get(), Some(&42));
    }

    #[test]
    fn test_once_only_once() {
        let once = Once::<_>::uninit();

        once.call_once(|| 42);
        let value = once.call_once(|| panic!("This should not be called"));
        assert_eq!(*value, 42);
    }

    fn check_concurrent_init<B: BackOff + 'static>() {
        let once = Arc::new(Once::<usize, B>::uninit());

        let num_threads = 10;
        let barrier = Arc::new(Barrier::new(num_threads));

        let mut handles = Vec::with_capacity(num_threads);

        for i in 0..num_threads {
            let once = once.clone();
            let barrier = barrier.clone();
            handles.push(spawn(move || {
                barrier.wait();
                *once.call_once(|| i)
            }));
        }

        let seen = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        let winner = *once.get().unwrap();
        assert!(seen.iter().all(|&value| value == winner));
    }

    #[test]
    fn test_concurrent_init() {
        check_concurrent_init::<Spin>();
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_concurrent_init_yield() {
        check_concurrent_init::<crate::locks::Yield>();
    }
}
