// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Devices and device selection with environment variable overrides.
//!
//! ## Environment Variables
//!
//! - `RUST_CL_PLATFORM` - substring the platform name must contain
//! - `RUST_CL_DEVICE` - substring the device name must contain
//! - `RUST_CL_DEVICE_TYPE` - comma separated device types
//!   (`cpu`, `gpu`, `accelerator`, `custom`, `default`, `all`)
//!
//! Substring matches are case-sensitive.
//!
//! ## Example
//!
//! ```rust
//! use rust_cl_core::mock::MockApi;
//! use rust_cl_core::{DeviceSelector, DeviceType, Runtime};
//!
//! let runtime = Runtime::new(MockApi::new());
//!
//! // Any compute device
//! let devices = DeviceSelector::default().select(&runtime)?;
//! assert!(!devices.is_empty());
//!
//! // First GPU whose name mentions "GPU"
//! let selector = DeviceSelector::new()
//!     .with_device_type(DeviceType::GPU)
//!     .with_device("GPU");
//! let gpu = selector.select_first(&runtime)?;
//! assert!(gpu.is_some());
//! # Ok::<(), rust_cl_core::Error>(())
//! ```

use std::fmt;

use bitflags::bitflags;

use crate::api::{InfoTarget, Runtime};
use crate::error::{Error, Result};
use crate::platform::{get_platforms, Platform};
use crate::query::{InfoRequest, NameVersion};
use crate::sys::{device_info, RawHandle, CL_TRUE};
use crate::traits::ValidatableConfig;

bitflags! {
    /// `cl_device_type` bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceType: u64 {
        /// `CL_DEVICE_TYPE_DEFAULT` (bit 0)
        const DEFAULT = 1 << 0;
        /// `CL_DEVICE_TYPE_CPU` (bit 1)
        const CPU = 1 << 1;
        /// `CL_DEVICE_TYPE_GPU` (bit 2)
        const GPU = 1 << 2;
        /// `CL_DEVICE_TYPE_ACCELERATOR` (bit 3)
        const ACCELERATOR = 1 << 3;
        /// `CL_DEVICE_TYPE_CUSTOM` (bit 4)
        const CUSTOM = 1 << 4;
        /// CPU, GPU or accelerator.
        const ALL_COMPUTE = Self::CPU.bits() | Self::GPU.bits() | Self::ACCELERATOR.bits();

        // Bits this crate does not name still round-trip.
        const _ = !0;
    }
}

impl DeviceType {
    /// Parse one device type name as used by `RUST_CL_DEVICE_TYPE`.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::DEFAULT),
            "cpu" => Some(Self::CPU),
            "gpu" => Some(Self::GPU),
            "accelerator" => Some(Self::ACCELERATOR),
            "custom" => Some(Self::CUSTOM),
            "all" => Some(Self::ALL_COMPUTE),
            _ => None,
        }
    }
}

/// One compute device of a platform. Root devices are not reference counted.
#[derive(Clone)]
pub struct Device {
    runtime: Runtime,
    raw: RawHandle,
}

impl Device {
    pub(crate) fn from_raw(runtime: Runtime, raw: RawHandle) -> Self {
        Self { runtime, raw }
    }

    /// The wrapped handle.
    #[must_use]
    pub fn as_raw(&self) -> RawHandle {
        self.raw
    }

    /// Runtime the device belongs to.
    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn info(&self, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(&self.runtime, InfoTarget::Device(self.raw), param)
    }

    /// Device name.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn name(&self) -> Result<String> {
        self.info(device_info::NAME).string()
    }

    /// Vendor name.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn vendor(&self) -> Result<String> {
        self.info(device_info::VENDOR).string()
    }

    /// Device version string.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn version(&self) -> Result<String> {
        self.info(device_info::VERSION).string()
    }

    /// Driver version string.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn driver_version(&self) -> Result<String> {
        self.info(device_info::DRIVER_VERSION).string()
    }

    /// Device type bits.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn device_type(&self) -> Result<DeviceType> {
        Ok(DeviceType::from_bits_retain(
            self.info(device_info::TYPE).scalar::<u64>()?,
        ))
    }

    /// Number of parallel compute units.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn max_compute_units(&self) -> Result<u32> {
        self.info(device_info::MAX_COMPUTE_UNITS).scalar()
    }

    /// Maximum work-items in one work-group.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn max_work_group_size(&self) -> Result<usize> {
        self.info(device_info::MAX_WORK_GROUP_SIZE).scalar()
    }

    /// Maximum work-items per dimension of a work-group.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn max_work_item_sizes(&self) -> Result<Vec<usize>> {
        self.info(device_info::MAX_WORK_ITEM_SIZES).vec()
    }

    /// Global memory size in bytes.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn global_mem_size(&self) -> Result<u64> {
        self.info(device_info::GLOBAL_MEM_SIZE).scalar()
    }

    /// Largest single allocation in bytes.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn max_mem_alloc_size(&self) -> Result<u64> {
        self.info(device_info::MAX_MEM_ALLOC_SIZE).scalar()
    }

    /// Whether the device is currently usable.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn available(&self) -> Result<bool> {
        Ok(self.info(device_info::AVAILABLE).scalar::<u32>()? == CL_TRUE)
    }

    /// Whether a compiler is present for this device.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn compiler_available(&self) -> Result<bool> {
        Ok(self.info(device_info::COMPILER_AVAILABLE).scalar::<u32>()? == CL_TRUE)
    }

    /// Accepted intermediate representations, e.g. `SPIR-V_1.2`.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn il_version(&self) -> Result<String> {
        self.info(device_info::IL_VERSION).string()
    }

    /// Supported extensions.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn extensions(&self) -> Result<Vec<String>> {
        Ok(self
            .info(device_info::EXTENSIONS)
            .string()?
            .split_whitespace()
            .map(str::to_owned)
            .collect())
    }

    /// Supported extensions with their versions.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn extensions_with_version(&self) -> Result<Vec<NameVersion>> {
        self.info(device_info::EXTENSIONS_WITH_VERSION)
            .name_versions()
    }

    /// Owning platform.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn platform(&self) -> Result<Platform> {
        let raw = self.info(device_info::PLATFORM).scalar::<usize>()?;
        Ok(Platform::from_raw(self.runtime.clone(), RawHandle::from_addr(raw)))
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.runtime.same_as(&other.runtime)
    }
}

impl Eq for Device {}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Device").field(&self.raw).finish()
    }
}

/// Configuration for device selection.
#[derive(Debug, Clone)]
pub struct DeviceSelector {
    /// Substring the platform name must contain.
    pub platform: Option<String>,
    /// Substring the device name must contain.
    pub device: Option<String>,
    /// Device types to enumerate.
    pub device_type: DeviceType,
    /// Crate name for logging.
    pub crate_name: Option<String>,
}

impl Default for DeviceSelector {
    fn default() -> Self {
        Self {
            platform: None,
            device: None,
            device_type: DeviceType::ALL_COMPUTE,
            crate_name: None,
        }
    }
}

impl DeviceSelector {
    /// Create a selector matching every compute device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the platform name to contain `substr`.
    #[must_use]
    pub fn with_platform(mut self, substr: impl Into<String>) -> Self {
        self.platform = Some(substr.into());
        self
    }

    /// Require the device name to contain `substr`.
    #[must_use]
    pub fn with_device(mut self, substr: impl Into<String>) -> Self {
        self.device = Some(substr.into());
        self
    }

    /// Set the device type mask.
    #[must_use]
    pub fn with_device_type(mut self, mask: DeviceType) -> Self {
        self.device_type = mask;
        self
    }

    /// Set crate name for logging.
    #[must_use]
    pub fn with_crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = Some(name.into());
        self
    }

    /// Build a selector from environment variables.
    ///
    /// Unknown device type names are skipped with a warning; if none of the
    /// listed names is known the default mask is kept.
    #[must_use]
    pub fn from_env() -> Self {
        let mut selector = Self::default();

        if let Ok(val) = std::env::var("RUST_CL_PLATFORM") {
            if !val.is_empty() {
                selector.platform = Some(val);
            }
        }
        if let Ok(val) = std::env::var("RUST_CL_DEVICE") {
            if !val.is_empty() {
                selector.device = Some(val);
            }
        }
        if let Ok(val) = std::env::var("RUST_CL_DEVICE_TYPE") {
            if let Some(mask) = parse_device_types(&val) {
                selector.device_type = mask;
            }
        }

        selector
    }

    /// All matching devices, in platform order.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for an invalid selector, or the first
    /// recoverable error of the underlying queries.
    pub fn select(&self, runtime: &Runtime) -> Result<Vec<Device>> {
        self.validate()?;
        let mut selected = Vec::new();
        for platform in get_platforms(runtime)? {
            if let Some(wanted) = &self.platform {
                if !platform.name()?.contains(wanted.as_str()) {
                    continue;
                }
            }
            for device in platform.devices(self.device_type)? {
                if let Some(wanted) = &self.device {
                    if !device.name()?.contains(wanted.as_str()) {
                        continue;
                    }
                }
                selected.push(device);
            }
        }
        tracing::info!(
            "{}: {} device(s) match {:?}",
            self.crate_name.as_deref().unwrap_or("rust-cl"),
            selected.len(),
            self
        );
        Ok(selected)
    }

    /// First matching device, if any.
    ///
    /// # Errors
    ///
    /// See [`DeviceSelector::select`].
    pub fn select_first(&self, runtime: &Runtime) -> Result<Option<Device>> {
        Ok(self.select(runtime)?.into_iter().next())
    }
}

impl ValidatableConfig for DeviceSelector {
    fn validate(&self) -> Result<()> {
        if self.device_type.is_empty() {
            return Err(Error::invalid_config("device type mask is empty"));
        }
        Ok(())
    }
}

fn parse_device_types(list: &str) -> Option<DeviceType> {
    let mut mask = DeviceType::empty();
    for name in list.split(',').filter(|s| !s.trim().is_empty()) {
        match DeviceType::from_type_name(name) {
            Some(bits) => mask |= bits,
            None => tracing::warn!("RUST_CL_DEVICE_TYPE: unknown device type {name:?} ignored"),
        }
    }
    (!mask.is_empty()).then_some(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_bits() {
        assert_eq!(DeviceType::GPU.bits(), 4);
        assert_eq!(DeviceType::ALL_COMPUTE.bits(), 2 | 4 | 8);
        let odd = DeviceType::from_bits_retain(1 << 40 | 4);
        assert_eq!(odd.bits(), 1 << 40 | 4);
        assert!(odd.contains(DeviceType::GPU));
    }

    #[test]
    fn test_device_type_names() {
        assert_eq!(DeviceType::from_type_name("GPU"), Some(DeviceType::GPU));
        assert_eq!(DeviceType::from_type_name(" all "), Some(DeviceType::ALL_COMPUTE));
        assert_eq!(DeviceType::from_type_name("fpga"), None);
        // flag names, as generated by bitflags, are exact and case-sensitive
        assert_eq!(DeviceType::from_name("ALL_COMPUTE"), Some(DeviceType::ALL_COMPUTE));
        assert_eq!(DeviceType::from_name("all"), None);
        assert_eq!(
            parse_device_types("cpu,gpu"),
            Some(DeviceType::CPU | DeviceType::GPU)
        );
        assert_eq!(parse_device_types("fpga"), None);
    }

    #[test]
    fn test_device_selector_default() {
        let selector = DeviceSelector::default();
        assert!(selector.platform.is_none());
        assert!(selector.device.is_none());
        assert_eq!(selector.device_type, DeviceType::ALL_COMPUTE);
        assert!(selector.validate().is_ok());
    }

    #[test]
    fn test_device_selector_builder() {
        let selector = DeviceSelector::new()
            .with_platform("Mock")
            .with_device("CPU")
            .with_device_type(DeviceType::CPU)
            .with_crate_name("test-crate");

        assert_eq!(selector.platform.as_deref(), Some("Mock"));
        assert_eq!(selector.device.as_deref(), Some("CPU"));
        assert_eq!(selector.device_type, DeviceType::CPU);
        assert_eq!(selector.crate_name.as_deref(), Some("test-crate"));
    }

    #[test]
    fn test_empty_mask_is_invalid() {
        let selector = DeviceSelector::new().with_device_type(DeviceType::empty());
        assert!(matches!(selector.validate(), Err(Error::InvalidConfig(_))));
    }
}
