// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Execution contexts.

use crate::api::{InfoTarget, Runtime};
use crate::classify::{ops, require};
use crate::device::Device;
use crate::error::Result;
use crate::platform::Platform;
use crate::query::InfoRequest;
use crate::sys::{context_info, ObjectKind, RawHandle, CONTEXT_PLATFORM, PROPERTIES_END};
use crate::traits::{impl_ref_counted, RefCounted};

/// A shared address space spanning one or more devices of one platform.
pub struct Context {
    runtime: Runtime,
    raw: RawHandle,
}

impl_ref_counted!(Context, ObjectKind::Context);

impl Context {
    /// Create a context for `devices`, optionally pinning the platform.
    ///
    /// The returned value holds the initial reference.
    ///
    /// # Errors
    ///
    /// Device-not-available, out-of-resources or out-of-host-memory.
    ///
    /// # Panics
    ///
    /// If `devices` is empty.
    // The property list carries handles as `intptr_t`; the bit pattern is what counts.
    #[allow(clippy::cast_possible_wrap)]
    pub fn create(devices: &[&Device], platform: Option<&Platform>) -> Result<Self> {
        require!(
            !devices.is_empty(),
            ops::CREATE_CONTEXT.name(),
            "device list is empty"
        );
        let runtime = devices[0].runtime().clone();

        let mut properties = Vec::with_capacity(3);
        if let Some(platform) = platform {
            properties.push(CONTEXT_PLATFORM);
            properties.push(platform.as_raw().addr() as isize);
        }
        properties.push(PROPERTIES_END);

        let handles: Vec<RawHandle> = devices.iter().map(|d| d.as_raw()).collect();
        let raw = match runtime.api().create_context(&properties, &handles) {
            Ok(raw) => raw,
            Err(status) => return Err(ops::CREATE_CONTEXT.fail(status)),
        };
        tracing::debug!(context = ?raw, devices = handles.len(), "context created");
        Ok(Self { runtime, raw })
    }

    /// Wrap `raw` after taking an extra reference on it.
    pub(crate) fn retained(runtime: Runtime, raw: RawHandle) -> Result<Self> {
        let context = Self { runtime, raw };
        context.retain()?;
        Ok(context)
    }

    /// Devices the context was created with.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn devices(&self) -> Result<Vec<Device>> {
        Ok(InfoRequest::new(
            &self.runtime,
            InfoTarget::Context(self.raw),
            context_info::DEVICES,
        )
        .vec::<usize>()?
        .into_iter()
        .map(|addr| Device::from_raw(self.runtime.clone(), RawHandle::from_addr(addr)))
        .collect())
    }

    /// Number of devices in the context.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn num_devices(&self) -> Result<u32> {
        InfoRequest::new(
            &self.runtime,
            InfoTarget::Context(self.raw),
            context_info::NUM_DEVICES,
        )
        .scalar()
    }
}
