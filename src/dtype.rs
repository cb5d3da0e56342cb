// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Element types for buffers and scalar kernel arguments.
//!
//! ## Why This Module Exists
//!
//! Buffers are parametric over their element type, and the byte image of an
//! element is what crosses the native boundary. An [`Element`] is therefore any
//! plain-old-data type: no padding, no pointers, every bit pattern valid. That
//! is exactly [`bytemuck::Pod`], so `Element` only adds a name for diagnostics.
//!
//! User-defined vector types (`float4` and friends) opt in with
//! `#[derive(Pod, Zeroable)]` plus `#[repr(C)]` and an `Element` impl.

use bytemuck::Pod;

/// A type whose values can live in device buffers and be passed by value to kernels.
pub trait Element: Pod + Send + Sync + 'static {
    /// Name used in log messages and diagnostics (the OpenCL C spelling).
    const NAME: &'static str;

    /// Whether this is a floating-point type.
    const IS_FLOAT: bool = false;
}

macro_rules! elements {
    ($($ty:ty => $name:literal $(, $float:literal)?;)+) => {
        $(
            impl Element for $ty {
                const NAME: &'static str = $name;
                $(const IS_FLOAT: bool = $float;)?
            }
        )+
    };
}

elements! {
    u8 => "uchar";
    i8 => "char";
    u16 => "ushort";
    i16 => "short";
    u32 => "uint";
    i32 => "int";
    u64 => "ulong";
    i64 => "long";
    usize => "size_t";
    isize => "ptrdiff_t";
    f32 => "float", true;
    f64 => "double", true;
}

impl<T: Element, const N: usize> Element for [T; N]
where
    [T; N]: Pod,
{
    const NAME: &'static str = T::NAME;
    const IS_FLOAT: bool = T::IS_FLOAT;
}

/// Size in bytes of one `T`.
#[must_use]
pub const fn bytes_per_element<T: Element>() -> usize {
    std::mem::size_of::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_names() {
        assert_eq!(f32::NAME, "float");
        assert_eq!(u64::NAME, "ulong");
        assert_eq!(<[f32; 4]>::NAME, "float");
    }

    #[test]
    fn test_float_flags() {
        assert!(f32::IS_FLOAT);
        assert!(f64::IS_FLOAT);
        assert!(!i32::IS_FLOAT);
        assert!(<[f64; 2]>::IS_FLOAT);
    }

    #[test]
    fn test_bytes_per_element() {
        assert_eq!(bytes_per_element::<f32>(), 4);
        assert_eq!(bytes_per_element::<[u16; 3]>(), 6);
    }
}
