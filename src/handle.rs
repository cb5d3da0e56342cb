// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Scoped acquisition of reference-counted objects.

use std::fmt;
use std::ops::Deref;

use crate::traits::RefCounted;

/// Releases the wrapped object exactly once when dropped, including during
/// unwinding and on early `?` returns.
///
/// ```rust
/// use rust_cl_core::mock::MockApi;
/// use rust_cl_core::{get_platforms, Context, DeviceType, RefCounted, Runtime};
///
/// let runtime = Runtime::new(MockApi::new());
/// let platform = &get_platforms(&runtime)?[0];
/// let device = &platform.devices(DeviceType::GPU)?[0];
/// let context = Context::create(&[device], Some(platform))?.scoped();
/// assert_eq!(context.reference_count()?, 1);
/// # Ok::<(), rust_cl_core::Error>(())
/// ```
pub struct Scoped<H: RefCounted> {
    inner: Option<H>,
}

impl<H: RefCounted> Scoped<H> {
    /// Take ownership of `handle`'s reference.
    pub fn new(handle: H) -> Self {
        Self {
            inner: Some(handle),
        }
    }

    /// Hand the reference back without releasing it.
    pub fn into_inner(mut self) -> H {
        match self.inner.take() {
            Some(handle) => handle,
            None => unreachable!("Scoped is only emptied by into_inner or drop"),
        }
    }
}

impl<H: RefCounted> Deref for Scoped<H> {
    type Target = H;

    fn deref(&self) -> &H {
        match &self.inner {
            Some(handle) => handle,
            None => unreachable!("Scoped is only emptied by into_inner or drop"),
        }
    }
}

impl<H: RefCounted> Drop for Scoped<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.take() {
            handle.release();
        }
    }
}

impl<H: RefCounted + fmt::Debug> fmt::Debug for Scoped<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scoped").field(&**self).finish()
    }
}
