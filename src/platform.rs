// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Platform enumeration.
//!
//! Platforms are the roots of discovery. They are owned by the runtime for the
//! lifetime of the process and are never retained or released.

use std::fmt;

use crate::api::{InfoTarget, Runtime};
use crate::classify::ops;
use crate::device::{Device, DeviceType};
use crate::error::Result;
use crate::query::{InfoRequest, NameVersion};
use crate::sys::{platform_info, RawHandle};

/// One vendor implementation of the compute API.
#[derive(Clone)]
pub struct Platform {
    runtime: Runtime,
    raw: RawHandle,
}

/// Enumerate all platforms.
///
/// Returns an empty list, not an error, when the runtime has none.
///
/// # Errors
///
/// Host allocation failure, natively or while building the list.
pub fn get_platforms(runtime: &Runtime) -> Result<Vec<Platform>> {
    let handles = enumerate(&ops::GET_PLATFORM_IDS, |entries, count| {
        runtime.api().get_platform_ids(entries, count)
    })?;
    tracing::info!(count = handles.len(), "platforms enumerated");
    Ok(handles
        .into_iter()
        .map(|raw| Platform {
            runtime: runtime.clone(),
            raw,
        })
        .collect())
}

/// Shared two-call enumeration for platform and device ids.
///
/// An [`crate::classify::Outcome::Absent`] status on either call yields an
/// empty list.
pub(crate) fn enumerate(
    operation: &crate::classify::Operation,
    mut call: impl FnMut(Option<&mut [RawHandle]>, Option<&mut u32>) -> crate::sys::Status,
) -> Result<Vec<RawHandle>> {
    let mut count = 0u32;
    if !operation.check_present(call(None, Some(&mut count)))? || count == 0 {
        return Ok(Vec::new());
    }
    let mut handles = Vec::new();
    handles.try_reserve_exact(count as usize)?;
    handles.resize(count as usize, RawHandle::NULL);
    if !operation.check_present(call(Some(handles.as_mut_slice()), None))? {
        return Ok(Vec::new());
    }
    Ok(handles)
}

impl Platform {
    pub(crate) fn from_raw(runtime: Runtime, raw: RawHandle) -> Self {
        Self { runtime, raw }
    }

    /// The wrapped handle.
    #[must_use]
    pub fn as_raw(&self) -> RawHandle {
        self.raw
    }

    /// Runtime the platform belongs to.
    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Devices of this platform matching `mask`.
    ///
    /// No matching device is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn devices(&self, mask: DeviceType) -> Result<Vec<Device>> {
        let handles = enumerate(&ops::GET_DEVICE_IDS, |entries, count| {
            self.runtime
                .api()
                .get_device_ids(self.raw, mask.bits(), entries, count)
        })?;
        tracing::debug!(platform = ?self.raw, ?mask, count = handles.len(), "devices enumerated");
        Ok(handles
            .into_iter()
            .map(|raw| Device::from_raw(self.runtime.clone(), raw))
            .collect())
    }

    fn info(&self, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(&self.runtime, InfoTarget::Platform(self.raw), param)
    }

    /// Platform name.
    ///
    /// # Errors
    ///
    /// Host allocation failure.
    pub fn name(&self) -> Result<String> {
        self.info(platform_info::NAME).string()
    }

    /// Vendor name.
    ///
    /// # Errors
    ///
    /// Host allocation failure.
    pub fn vendor(&self) -> Result<String> {
        self.info(platform_info::VENDOR).string()
    }

    /// Version string, `OpenCL <major>.<minor> <vendor info>`.
    ///
    /// # Errors
    ///
    /// Host allocation failure.
    pub fn version(&self) -> Result<String> {
        self.info(platform_info::VERSION).string()
    }

    /// `FULL_PROFILE` or `EMBEDDED_PROFILE`.
    ///
    /// # Errors
    ///
    /// Host allocation failure.
    pub fn profile(&self) -> Result<String> {
        self.info(platform_info::PROFILE).string()
    }

    /// Supported extensions.
    ///
    /// # Errors
    ///
    /// Host allocation failure.
    pub fn extensions(&self) -> Result<Vec<String>> {
        Ok(self
            .info(platform_info::EXTENSIONS)
            .string()?
            .split_whitespace()
            .map(str::to_owned)
            .collect())
    }

    /// Supported extensions with their versions.
    ///
    /// # Errors
    ///
    /// Host allocation failure.
    pub fn extensions_with_version(&self) -> Result<Vec<NameVersion>> {
        self.info(platform_info::EXTENSIONS_WITH_VERSION)
            .name_versions()
    }

    /// Packed `cl_version` of the platform.
    ///
    /// # Errors
    ///
    /// Host allocation failure.
    pub fn numeric_version(&self) -> Result<u32> {
        self.info(platform_info::NUMERIC_VERSION).scalar()
    }
}

impl PartialEq for Platform {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.runtime.same_as(&other.runtime)
    }
}

impl Eq for Platform {}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Platform").field(&self.raw).finish()
    }
}
