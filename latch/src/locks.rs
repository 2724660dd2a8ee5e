//! Locks related utilities.
//!
//! ## Modules
//!
//! - `spin` : Provides a test-and-set spin lock.
//!
//! ## Back-off Strategy
//!
//! Waiters never sleep. What a waiter does between two acquisition
//! attempts is decided by a `BackOff` implementation, given as a type
//! parameter to the lock.

pub mod spin;

/// A trait that defines a back-off strategy for locks.
///
/// `back_off` is called every time a thread fails to acquire a lock
/// and is about to retry.
pub trait BackOff {
    /// Performs the back-off operation.
    fn back_off();
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A back-off strategy that uses a spin-wait loop.
///
/// `core::hint::spin_loop` tells the CPU we are busy-waiting,
/// which lowers power draw and frees resources for a sibling hyperthread.
pub struct Spin;

impl BackOff for Spin {
    #[inline]
    fn back_off() {
        core::hint::spin_loop();
    }
}

#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A back-off strategy that gives the rest of the time slice back to the OS scheduler.
///
/// Only useful on hosted targets, where the lock holder may have been preempted.
pub struct Yield;

#[cfg(feature = "std")]
impl BackOff for Yield {
    #[inline]
    fn back_off() {
        std::thread::yield_now();
    }
}
