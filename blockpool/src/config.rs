//! Build-time configuration of the default pool geometry.
//!
//! `BlockPool` takes its block size and block count as const generics.
//! When they are left out, the values below are used. They default to
//! 32-byte blocks and 10 blocks, and can be overridden when building the crate:
//!
//! ```sh
//! BLOCKPOOL_BLOCK_SIZE=64 BLOCKPOOL_BLOCK_COUNT=128 cargo build
//! ```
//!
//! A value that is not a plain decimal integer fails the build.

/// Block size used when the environment does not override it.
pub const DEFAULT_BLOCK_SIZE: usize = 32;
/// Block count used when the environment does not override it.
pub const DEFAULT_BLOCK_COUNT: usize = 10;

/// Default size of a block, in bytes.
pub const BLOCK_SIZE: usize = parse_or(option_env!("BLOCKPOOL_BLOCK_SIZE"), DEFAULT_BLOCK_SIZE);
/// Default number of blocks in a pool.
pub const BLOCK_COUNT: usize = parse_or(option_env!("BLOCKPOOL_BLOCK_COUNT"), DEFAULT_BLOCK_COUNT);

/// Smallest alignment a block size may have, whatever the target.
pub const MIN_BLOCK_ALIGN: usize = 4;

/// Alignment of every block, and the granularity block sizes must respect.
///
/// This is the machine word alignment, but never less than `MIN_BLOCK_ALIGN`.
pub const BLOCK_ALIGN: usize = if align_of::<usize>() > MIN_BLOCK_ALIGN {
    align_of::<usize>()
} else {
    MIN_BLOCK_ALIGN
};

/// Parses a decimal integer at compile time, falling back to `default` if there is no value.
const fn parse_or(value: Option<&str>, default: usize) -> usize {
    let Some(value) = value else {
        return default;
    };

    let digits = value.as_bytes();
    assert!(!digits.is_empty(), "empty pool geometry override");

    let mut parsed = 0_usize;
    let mut i = 0;
    while i < digits.len() {
        let digit = digits[i];
        assert!(digit.is_ascii_digit(), "pool geometry override is not a decimal integer");

        parsed = match parsed.checked_mul(10) {
            Some(shifted) => shifted,
            None => panic!("pool geometry override overflows usize"),
        };
        parsed = match parsed.checked_add((digit - b'0') as usize) {
            Some(sum) => sum,
            None => panic!("pool geometry override overflows usize"),
        };
        i += 1;
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(None, 32), 32);
        assert_eq!(parse_or(Some("0"), 32), 0);
        assert_eq!(parse_or(Some("64"), 32), 64);
        assert_eq!(parse_or(Some("007"), 32), 7);
    }

    #[test]
    #[should_panic(expected = "not a decimal integer")]
    fn test_parse_or_rejects_garbage() {
        let _ = parse_or(Some("12k"), 32);
    }

    #[test]
    fn test_block_align() {
        assert!(BLOCK_ALIGN >= MIN_BLOCK_ALIGN);
        assert!(BLOCK_ALIGN.is_power_of_two());
        assert_eq!(BLOCK_ALIGN % align_of::<usize>(), 0);
    }
}
