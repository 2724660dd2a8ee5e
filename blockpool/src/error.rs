use thiserror::Error;

/// Errors that can occur during pool operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolError {
    /// Every block is in use
    #[error("Block pool exhausted")]
    Exhausted,
    /// Attempted to free a null pointer
    #[error("Null pointer")]
    NullPointer,
    /// Attempted to free a pointer that does not belong to the arena
    #[error("Pointer outside of the arena")]
    OutOfBounds,
    /// Attempted to free a pointer that is not on a block boundary
    #[error("Pointer not aligned to a block boundary")]
    Misaligned,
    /// Attempted to free a block that is already free
    #[error("Double free detected")]
    DoubleFree,
}

pub type Result<T> = core::result::Result<T, PoolError>;
