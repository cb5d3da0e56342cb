// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Command queues.
//!
//! Commands on a queue created without
//! [`QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE`] execute in submission
//! order. Everything else is ordered only by event wait-lists. The enqueue
//! operations themselves live in [`crate::enqueue`].

use bitflags::bitflags;

use crate::api::{InfoTarget, Runtime};
use crate::classify::ops;
use crate::context::Context;
use crate::device::Device;
use crate::error::Result;
use crate::query::InfoRequest;
use crate::sys::{queue_info, ObjectKind, RawHandle, QUEUE_PROPERTIES};
use crate::traits::{impl_ref_counted, RefCounted};

bitflags! {
    /// `cl_command_queue_properties` bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueueProperties: u64 {
        /// Commands may execute in any order their wait-lists allow (bit 0).
        const OUT_OF_ORDER_EXEC_MODE_ENABLE = 1 << 0;
        /// Record profiling timestamps on events (bit 1).
        const PROFILING_ENABLE = 1 << 1;
        /// Device-side queue (bit 2).
        const ON_DEVICE = 1 << 2;
        /// Default device-side queue (bit 3).
        const ON_DEVICE_DEFAULT = 1 << 3;

        const _ = !0;
    }
}

/// A command stream bound to one device of a context.
pub struct CommandQueue {
    pub(crate) runtime: Runtime,
    pub(crate) raw: RawHandle,
}

impl_ref_counted!(CommandQueue, ObjectKind::CommandQueue);

impl CommandQueue {
    /// Create a queue on `device` within `context`.
    ///
    /// # Errors
    ///
    /// `QueuePropertiesNotSupported` when the device cannot honour
    /// `properties`, or resource and host allocation failures.
    pub fn create(context: &Context, device: &Device, properties: QueueProperties) -> Result<Self> {
        let runtime = context.runtime().clone();
        let full = [QUEUE_PROPERTIES, properties.bits(), 0];
        let list = if properties.is_empty() {
            &full[2..]
        } else {
            &full[..]
        };
        let raw = runtime
            .api()
            .create_command_queue(context.as_raw(), device.as_raw(), list)
            .map_err(|status| ops::CREATE_COMMAND_QUEUE.fail(status))?;
        tracing::debug!(queue = ?raw, ?properties, "command queue created");
        Ok(Self { runtime, raw })
    }

    /// Block until every command enqueued so far has completed.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn finish(&self) -> Result<()> {
        ops::FINISH.check(self.runtime.api().finish(self.raw))
    }

    /// Submit every enqueued command to the device without waiting.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn flush(&self) -> Result<()> {
        ops::FLUSH.check(self.runtime.api().flush(self.raw))
    }

    fn info(&self, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(&self.runtime, InfoTarget::CommandQueue(self.raw), param)
    }

    /// Owning context, as a new reference the caller must release.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn context(&self) -> Result<Context> {
        let raw = self.info(queue_info::CONTEXT).scalar::<usize>()?;
        Context::retained(self.runtime.clone(), RawHandle::from_addr(raw))
    }

    /// Device the queue submits to.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn device(&self) -> Result<Device> {
        let raw = self.info(queue_info::DEVICE).scalar::<usize>()?;
        Ok(Device::from_raw(self.runtime.clone(), RawHandle::from_addr(raw)))
    }

    /// Properties the queue was created with.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn properties(&self) -> Result<QueueProperties> {
        Ok(QueueProperties::from_bits_retain(
            self.info(queue_info::PROPERTIES).scalar::<u64>()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_property_bits() {
        assert_eq!(QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE.bits(), 1);
        assert_eq!(QueueProperties::PROFILING_ENABLE.bits(), 2);
        assert_eq!(QueueProperties::ON_DEVICE.bits(), 4);
        assert_eq!(QueueProperties::ON_DEVICE_DEFAULT.bits(), 8);
        let reserved = QueueProperties::from_bits_retain(0x100 | 2);
        assert_eq!(reserved.bits(), 0x102);
    }
}
