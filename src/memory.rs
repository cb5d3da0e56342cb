// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Element-to-byte arithmetic.
//!
//! ## Why This Module Exists
//!
//! The native API counts in bytes; buffers, offsets and transfers in this crate
//! count in elements. Every conversion goes through the functions below so
//! that the multiplication, and its overflow check, is written once.
//!
//! Overflow means the caller asked for an object larger than the address
//! space. That is a usage bug, so it panics rather than returning an error.

use crate::classify::require;
use crate::dtype::Element;

/// Bytes occupied by `count` elements of `T`.
///
/// # Panics
///
/// If the product overflows `usize`.
#[must_use]
#[track_caller]
pub fn byte_len<T: Element>(count: usize) -> usize {
    match count.checked_mul(std::mem::size_of::<T>()) {
        Some(bytes) => bytes,
        None => crate::classify::violated(
            "byte_len",
            format_args!("{count} elements of {} overflow usize", T::NAME),
        ),
    }
}

/// Byte range `(offset, size)` for `count` elements starting at element `offset`
/// of a buffer holding `len` elements.
///
/// # Panics
///
/// If the range does not fit inside the buffer.
#[must_use]
#[track_caller]
pub fn byte_range<T: Element>(operation: &str, len: usize, offset: usize, count: usize) -> (usize, usize) {
    let end = offset.checked_add(count);
    require!(
        end.is_some_and(|end| end <= len),
        operation,
        "elements {offset}..{offset}+{count} exceed buffer of {len} {}",
        T::NAME
    );
    (byte_len::<T>(offset), byte_len::<T>(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_len() {
        assert_eq!(byte_len::<f32>(1024), 4096);
        assert_eq!(byte_len::<u8>(0), 0);
        assert_eq!(byte_len::<[f64; 2]>(3), 48);
    }

    #[test]
    fn test_byte_range() {
        assert_eq!(byte_range::<u32>("read", 16, 4, 8), (16, 32));
        assert_eq!(byte_range::<u32>("read", 16, 16, 0), (64, 0));
    }

    #[test]
    #[should_panic(expected = "overflow usize")]
    fn test_byte_len_overflow() {
        let _ = byte_len::<u64>(usize::MAX / 2);
    }

    #[test]
    #[should_panic(expected = "exceed buffer")]
    fn test_byte_range_out_of_bounds() {
        let _ = byte_range::<f32>("write", 8, 4, 5);
    }
}
