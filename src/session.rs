// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! One-device convenience facade.
//!
//! Most host programs want exactly one device, one context and one in-order
//! queue. [`Session`] performs that setup from a [`DeviceSelector`] and owns
//! the context and queue: dropping the session releases the queue, then the
//! context. Objects created through the session (programs, kernels, buffers,
//! events) are ordinary wrappers and are released by their owner as usual.
//!
//! ## Example
//!
//! ```rust
//! use rust_cl_core::mock::MockApi;
//! use rust_cl_core::{MemFlags, RefCounted, Runtime, Session, SessionConfig};
//!
//! let runtime = Runtime::new(MockApi::new());
//! let session = Session::new(&runtime, SessionConfig::new().with_profiling(true))?;
//!
//! let buffer = session.buffer_from(MemFlags::READ_WRITE, &[1u32, 2, 3])?;
//! assert_eq!(session.read_all(&buffer)?, vec![1, 2, 3]);
//! buffer.release();
//! # Ok::<(), rust_cl_core::Error>(())
//! ```

use crate::api::Runtime;
use crate::buffer::{Buffer, MemFlags};
use crate::context::Context;
use crate::device::{Device, DeviceSelector};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::handle::Scoped;
use crate::kernel::Kernel;
use crate::program::Program;
use crate::queue::{CommandQueue, QueueProperties};
use crate::traits::{RefCounted, ValidatableConfig};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Which device to use; the first match wins.
    pub selector: DeviceSelector,
    /// Properties of the session's queue.
    pub queue_properties: QueueProperties,
    /// Log the chosen device at info level.
    pub verbose: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            selector: DeviceSelector::default(),
            queue_properties: QueueProperties::empty(),
            verbose: false,
        }
    }
}

impl SessionConfig {
    /// Create a configuration matching any compute device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration whose selector is read from `RUST_CL_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            selector: DeviceSelector::from_env(),
            ..Self::default()
        }
    }

    /// Replace the device selector.
    #[must_use]
    pub fn with_selector(mut self, selector: DeviceSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Enable or disable queue profiling.
    #[must_use]
    pub fn with_profiling(mut self, enable: bool) -> Self {
        self.queue_properties
            .set(QueueProperties::PROFILING_ENABLE, enable);
        self
    }

    /// Enable or disable out-of-order execution.
    #[must_use]
    pub fn with_out_of_order(mut self, enable: bool) -> Self {
        self.queue_properties
            .set(QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE, enable);
        self
    }

    /// Set verbose mode.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl ValidatableConfig for SessionConfig {
    fn validate(&self) -> Result<()> {
        self.selector.validate()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// A device with its own context and command queue.
///
/// Field order matters: the queue is released before the context.
pub struct Session {
    queue: Scoped<CommandQueue>,
    context: Scoped<Context>,
    device: Device,
    config: SessionConfig,
}

impl Session {
    /// Select a device and create a context and queue for it.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidConfig` if the selector is invalid
    /// - `Error::Unavailable` if no device matches
    /// - `QueuePropertiesNotSupported` if the device cannot honour the queue flags
    /// - resource and allocation failures of the setup calls
    pub fn new(runtime: &Runtime, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let Some(device) = config.selector.select_first(runtime)? else {
            return Err(Error::unavailable(format!(
                "no device matches {:?}",
                config.selector
            )));
        };

        let context = Context::create(&[&device], None)?.scoped();
        let queue = CommandQueue::create(&context, &device, config.queue_properties)?.scoped();

        if config.verbose {
            tracing::info!(
                device = %device.name()?,
                properties = ?config.queue_properties,
                "session ready"
            );
        } else {
            tracing::debug!(device = ?device, "session ready");
        }

        Ok(Self {
            queue,
            context,
            device,
            config,
        })
    }

    /// The selected device.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The session's context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The session's command queue.
    #[must_use]
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Runtime the session dispatches to.
    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        self.context.runtime()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a program from OpenCL C source and build it for the session's device.
    ///
    /// On a build failure the compiler log is emitted at warn level and the
    /// original error is returned; the program is released.
    ///
    /// # Errors
    ///
    /// `BuildProgramFailure`, `CompilerNotAvailable`, or resource and
    /// allocation failures.
    pub fn build_program(&self, source: &str, options: &str) -> Result<Program> {
        let program = Program::create_with_source(&self.context, source)?.scoped();
        if let Err(err) = program.build(&[&self.device], options) {
            if err.is_build_failure() {
                match program.build_log(&self.device) {
                    Ok(log) => tracing::warn!(
                        log_bytes = log.len(),
                        "build log:\n{log}"
                    ),
                    Err(log_err) => tracing::warn!(%log_err, "build log unavailable"),
                }
            }
            return Err(err);
        }
        Ok(program.into_inner())
    }

    /// Build `source` and create the kernel called `name` from it.
    ///
    /// The program is released once the kernel holds it.
    ///
    /// # Errors
    ///
    /// See [`Session::build_program`], plus `InvalidKernelName` and
    /// `InvalidKernelDefinition`.
    pub fn kernel(&self, source: &str, options: &str, name: &str) -> Result<Kernel> {
        let program = self.build_program(source, options)?.scoped();
        Kernel::create(&program, name)
    }

    /// Allocate an uninitialized buffer of `len` elements.
    ///
    /// # Errors
    ///
    /// `OutOfDeviceMemory` or resource and allocation failures.
    pub fn buffer<T: Element>(&self, flags: MemFlags, len: usize) -> Result<Buffer<T>> {
        Buffer::create(&self.context, flags, len)
    }

    /// Allocate a buffer initialized from `data`.
    ///
    /// # Errors
    ///
    /// See [`Session::buffer`].
    pub fn buffer_from<T: Element>(&self, flags: MemFlags, data: &[T]) -> Result<Buffer<T>> {
        Buffer::create_with_data(&self.context, flags, data)
    }

    /// Blocking read of a whole buffer.
    ///
    /// # Errors
    ///
    /// See [`CommandQueue::enqueue_read_buffer`].
    pub fn read_all<T: Element>(&self, buffer: &Buffer<T>) -> Result<Vec<T>> {
        let mut out = Vec::new();
        out.try_reserve_exact(buffer.len())?;
        out.resize(buffer.len(), T::zeroed());
        self.queue
            .enqueue_read_buffer(buffer, 0, &mut out, &[])?
            .release();
        Ok(out)
    }

    /// Blocking write of `data` at element `offset`.
    ///
    /// # Errors
    ///
    /// See [`CommandQueue::enqueue_write_buffer`].
    pub fn write<T: Element>(&self, buffer: &Buffer<T>, offset: usize, data: &[T]) -> Result<()> {
        self.queue
            .enqueue_write_buffer(buffer, offset, data, &[])?
            .release();
        Ok(())
    }

    /// Block until every command of the session's queue has completed.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn finish(&self) -> Result<()> {
        self.queue.finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!(device = ?self.device, "session closing");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("device", &self.device)
            .field("context", &*self.context)
            .field("queue", &*self.queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceType;
    use crate::error::ErrorKind;
    use crate::mock::MockApi;

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfig::new()
            .with_profiling(true)
            .with_out_of_order(true)
            .with_verbose(true);
        assert!(config
            .queue_properties
            .contains(QueueProperties::PROFILING_ENABLE | QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE));
        assert!(config.validate().is_ok());

        let config = config.with_profiling(false);
        assert!(!config
            .queue_properties
            .contains(QueueProperties::PROFILING_ENABLE));
    }

    #[test]
    fn test_session_releases_on_drop() {
        let mock = MockApi::new();
        let runtime = Runtime::new(mock.clone());
        {
            let session = Session::new(&runtime, SessionConfig::new()).unwrap();
            assert_eq!(session.context().reference_count().unwrap(), 1);
            assert!(session.runtime().same_as(&runtime));
            assert_eq!(mock.live_objects(), 2);
        }
        assert_eq!(mock.live_objects(), 0);
    }

    #[test]
    fn test_session_without_match_is_unavailable() {
        let runtime = Runtime::new(MockApi::new());
        let config = SessionConfig::new().with_selector(
            DeviceSelector::new().with_device_type(DeviceType::ACCELERATOR),
        );
        let err = Session::new(&runtime, config).unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }

    #[test]
    fn test_build_failure_returns_original_error() {
        let mock = MockApi::new();
        let runtime = Runtime::new(mock.clone());
        let session = Session::new(&runtime, SessionConfig::new()).unwrap();
        let err = session
            .build_program("__kernel void f(__global int* x) { x[0] = 1; ", "")
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::BuildProgramFailure));
        drop(session);
        assert_eq!(mock.live_objects(), 0);
    }

    #[test]
    fn test_kernel_and_buffers() {
        let mock = MockApi::new();
        let runtime = Runtime::new(mock.clone());
        let session = Session::new(&runtime, SessionConfig::new()).unwrap();
        let kernel = session
            .kernel(
                "__kernel void copy(__global const float* a, __global float* b) { b[0] = a[0]; }",
                "",
                "copy",
            )
            .unwrap();
        let src = session.buffer_from(MemFlags::READ_ONLY, &[1.5f32, 2.5]).unwrap();
        let dst = session.buffer::<f32>(MemFlags::WRITE_ONLY, 2).unwrap();
        kernel.set_arg(0, &src).unwrap();
        kernel.set_arg(1, &dst).unwrap();
        session
            .queue()
            .enqueue_nd_range_kernel(&kernel, None, &[2], None, &[])
            .unwrap()
            .release();
        assert_eq!(session.read_all(&dst).unwrap(), vec![1.5, 2.5]);

        session.write(&dst, 1, &[9.0]).unwrap();
        assert_eq!(session.read_all(&dst).unwrap(), vec![1.5, 9.0]);
        session.finish().unwrap();

        kernel.release();
        src.release();
        dst.release();
        drop(session);
        assert_eq!(mock.live_objects(), 0);
    }
}
