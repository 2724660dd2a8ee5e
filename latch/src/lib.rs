//! Latch provides the synchronization primitives `blockpool` is built on.
//!
//! Everything here is `no_std` and allocation free, so it can guard state
//! on targets that have neither an OS scheduler nor a heap.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]

pub mod locks;
pub mod once;
