// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Kernels and argument binding.
//!
//! Arguments are bound by position. The byte image of the value is copied by
//! the runtime at the time of the call, so the value need not outlive
//! [`Kernel::set_arg`]; buffers are bound by handle.

use std::ffi::CString;

use crate::api::{InfoTarget, Runtime};
use crate::buffer::Buffer;
use crate::classify::{ops, violated};
use crate::dtype::Element;
use crate::error::Result;
use crate::program::Program;
use crate::query::InfoRequest;
use crate::sys::{kernel_info, ObjectKind, RawHandle};
use crate::traits::{impl_ref_counted, RefCounted};

/// What a kernel argument looks like at the native boundary.
#[derive(Debug, Clone, Copy)]
pub enum ArgValue<'a> {
    /// A by-value argument: its raw bytes.
    Bytes(&'a [u8]),
    /// A memory object, passed as its handle.
    Handle(RawHandle),
    /// A `__local` allocation of the given byte size (no value).
    Local(usize),
}

/// Types that can be bound to a kernel argument slot.
pub trait KernelArg {
    /// Native representation of the argument.
    fn arg_value(&self) -> ArgValue<'_>;
}

impl<T: Element> KernelArg for T {
    fn arg_value(&self) -> ArgValue<'_> {
        ArgValue::Bytes(bytemuck::bytes_of(self))
    }
}

impl<T: Element> KernelArg for Buffer<T> {
    fn arg_value(&self) -> ArgValue<'_> {
        ArgValue::Handle(self.as_raw())
    }
}

/// Size in bytes of a `__local` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalMemory(pub usize);

impl LocalMemory {
    /// Room for `count` elements of `T`.
    #[must_use]
    pub fn for_elements<T: Element>(count: usize) -> Self {
        Self(crate::memory::byte_len::<T>(count))
    }
}

impl KernelArg for LocalMemory {
    fn arg_value(&self) -> ArgValue<'_> {
        ArgValue::Local(self.0)
    }
}

/// A named entry point of a built program.
pub struct Kernel {
    pub(crate) runtime: Runtime,
    pub(crate) raw: RawHandle,
}

impl_ref_counted!(Kernel, ObjectKind::Kernel);

impl Kernel {
    /// Extract the entry point `name` from a built program.
    ///
    /// # Errors
    ///
    /// `InvalidKernelName` if the program has no such kernel,
    /// `InvalidKernelDefinition` if its signature cannot be launched, or
    /// resource and host allocation failures.
    ///
    /// # Panics
    ///
    /// If `name` contains a NUL byte or the program is not built.
    pub fn create(program: &Program, name: &str) -> Result<Self> {
        let Ok(name_c) = CString::new(name) else {
            violated(
                ops::CREATE_KERNEL.name(),
                format_args!("kernel name {name:?} contains a NUL byte"),
            )
        };
        let runtime = program.runtime().clone();
        let raw = runtime
            .api()
            .create_kernel(program.as_raw(), &name_c)
            .map_err(|status| ops::CREATE_KERNEL.fail(status))?;
        tracing::debug!(kernel = ?raw, name, "kernel created");
        Ok(Self { runtime, raw })
    }

    /// Bind `value` to argument `index`.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    ///
    /// # Panics
    ///
    /// If `index` is out of range or the value's size does not match the
    /// declared parameter.
    pub fn set_arg<A: KernelArg + ?Sized>(&self, index: u32, value: &A) -> Result<()> {
        let status = match value.arg_value() {
            ArgValue::Bytes(bytes) => {
                self.runtime
                    .api()
                    .set_kernel_arg(self.raw, index, bytes.len(), Some(bytes))
            }
            ArgValue::Handle(handle) => {
                let bytes = handle.to_ne_bytes();
                self.runtime
                    .api()
                    .set_kernel_arg(self.raw, index, bytes.len(), Some(&bytes))
            }
            ArgValue::Local(size) => self.runtime.api().set_kernel_arg(self.raw, index, size, None),
        };
        ops::SET_KERNEL_ARG.check(status)
    }

    fn info(&self, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(&self.runtime, InfoTarget::Kernel(self.raw), param)
    }

    /// Entry point name.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn function_name(&self) -> Result<String> {
        self.info(kernel_info::FUNCTION_NAME).string()
    }

    /// Number of declared parameters.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn num_args(&self) -> Result<u32> {
        self.info(kernel_info::NUM_ARGS).scalar()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_arg_bytes() {
        let value = 1.5f32;
        match value.arg_value() {
            ArgValue::Bytes(bytes) => assert_eq!(bytes, &1.5f32.to_ne_bytes()[..]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_local_memory_size() {
        assert_eq!(LocalMemory::for_elements::<f32>(64), LocalMemory(256));
        assert!(matches!(LocalMemory(16).arg_value(), ArgValue::Local(16)));
    }
}
