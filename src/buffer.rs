// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Typed device-memory buffers.

use std::fmt;
use std::marker::PhantomData;

use bitflags::bitflags;

use crate::api::{InfoTarget, Runtime};
use crate::classify::ops;
use crate::context::Context;
use crate::dtype::Element;
use crate::error::Result;
use crate::memory::byte_len;
use crate::query::InfoRequest;
use crate::sys::{mem_info, ObjectKind, RawHandle};
use crate::traits::RefCounted;

bitflags! {
    /// `cl_mem_flags` bitmask.
    ///
    /// Access flags are enforced by the runtime, not by this crate; a transfer
    /// that contradicts them fails with `InvalidOperation`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemFlags: u64 {
        /// Kernels may read and write (bit 0, the default).
        const READ_WRITE = 1 << 0;
        /// Kernels may only write (bit 1).
        const WRITE_ONLY = 1 << 1;
        /// Kernels may only read (bit 2).
        const READ_ONLY = 1 << 2;
        /// Use the host pointer as backing storage (bit 3).
        const USE_HOST_PTR = 1 << 3;
        /// Allocate from host-accessible memory (bit 4).
        const ALLOC_HOST_PTR = 1 << 4;
        /// Copy from the host pointer at creation (bit 5).
        const COPY_HOST_PTR = 1 << 5;
        /// The host will only write (bit 7).
        const HOST_WRITE_ONLY = 1 << 7;
        /// The host will only read (bit 8).
        const HOST_READ_ONLY = 1 << 8;
        /// The host will neither read nor write (bit 9).
        const HOST_NO_ACCESS = 1 << 9;

        const _ = !0;
    }
}

/// A device allocation of `len` elements of `T`.
pub struct Buffer<T: Element> {
    runtime: Runtime,
    raw: RawHandle,
    len: usize,
    _element: PhantomData<T>,
}

impl<T: Element> RefCounted for Buffer<T> {
    const KIND: ObjectKind = ObjectKind::Mem;

    fn as_raw(&self) -> RawHandle {
        self.raw
    }

    fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn alias(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            raw: self.raw,
            len: self.len,
            _element: PhantomData,
        }
    }
}

impl<T: Element> Buffer<T> {
    /// Allocate `len` uninitialised elements.
    ///
    /// A zero length is passed through; the runtime decides whether it is
    /// legal and a rejection surfaces as an allocation failure.
    ///
    /// # Errors
    ///
    /// Allocation failures (`OutOfDeviceMemory`, `OutOfResources`,
    /// `OutOfHostMemory`).
    pub fn create(context: &Context, flags: MemFlags, len: usize) -> Result<Self> {
        Self::allocate(context, flags, len, None)
    }

    /// Allocate and initialise from `data`.
    ///
    /// [`MemFlags::COPY_HOST_PTR`] is added to `flags`; `data` is only read
    /// during this call.
    ///
    /// # Errors
    ///
    /// See [`Buffer::create`].
    pub fn create_with_data(context: &Context, flags: MemFlags, data: &[T]) -> Result<Self> {
        Self::allocate(
            context,
            flags | MemFlags::COPY_HOST_PTR,
            data.len(),
            Some(bytemuck::cast_slice(data)),
        )
    }

    fn allocate(context: &Context, flags: MemFlags, len: usize, host: Option<&[u8]>) -> Result<Self> {
        let runtime = context.runtime().clone();
        let size = byte_len::<T>(len);
        let raw = runtime
            .api()
            .create_buffer(context.as_raw(), flags.bits(), size, host)
            .map_err(|status| ops::CREATE_BUFFER.fail(status))?;
        tracing::debug!(buffer = ?raw, element = T::NAME, len, size, ?flags, "buffer created");
        Ok(Self {
            runtime,
            raw,
            len,
            _element: PhantomData,
        })
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn info(&self, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(&self.runtime, InfoTarget::Mem(self.raw), param)
    }

    /// Allocation size in bytes, as the runtime reports it.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn size_bytes(&self) -> Result<usize> {
        self.info(mem_info::SIZE).scalar()
    }

    /// Flags the buffer was created with.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn flags(&self) -> Result<MemFlags> {
        Ok(MemFlags::from_bits_retain(
            self.info(mem_info::FLAGS).scalar::<u64>()?,
        ))
    }
}

impl<T: Element> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("raw", &self.raw)
            .field("element", &T::NAME)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_flag_bits() {
        assert_eq!(MemFlags::READ_WRITE.bits(), 1);
        assert_eq!(MemFlags::COPY_HOST_PTR.bits(), 32);
        assert_eq!(MemFlags::HOST_NO_ACCESS.bits(), 512);
        // bit 6 is unnamed but must survive
        let raw = MemFlags::from_bits_retain(1 << 6 | 1);
        assert_eq!(raw.bits(), 65);
    }
}
