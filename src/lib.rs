// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! # rust-cl-core
//!
//! Host-side binding layer over OpenCL-style heterogeneous compute runtimes:
//! reference-counted handles, the two-call info protocol, per-operation error
//! classification, command queues and the event graph.
//!
//! ## Design Philosophy
//!
//! **Errors are classified, not guessed**: every native status an entry point
//! can return is mapped to one of three outcomes. Statuses that only a caller
//! bug can produce panic with a "precondition violated" message; statuses the
//! caller can handle become an [`Error`] carrying an [`ErrorKind`] and the
//! original numeric status; "nothing found" becomes an empty result. A status
//! outside the table panics as a binding bug.
//!
//! **Ownership is explicit**: each wrapper owns one native reference. Cleanup
//! is [`RefCounted::release`] or a [`Scoped`] guard, and sharing is
//! [`RefCounted::try_clone`].
//!
//! ## Modules
//!
//! - [`sys`] - native numeric space (statuses, handles, selectors)
//! - [`api`] - the [`NativeApi`] boundary and the shared [`Runtime`]
//! - [`classify`] - per-operation outcome tables
//! - [`error`] - [`Error`], [`ErrorKind`] and [`Result`]
//! - [`query`] - the two-call info protocol
//! - [`platform`], [`device`], [`context`], [`queue`], [`program`], [`kernel`],
//!   [`buffer`], [`event`] - the object wrappers
//! - [`enqueue`] - queue operations (kernels, transfers, copies, markers)
//! - [`session`] - one-device convenience facade
//! - [`logging`] - tracing setup and structured log helpers
//! - [`mock`] - deterministic in-process runtime
//! - `opencl` - the system OpenCL loader (feature `opencl`)
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_cl_core::mock::MockApi;
//! use rust_cl_core::{DeviceSelector, Result, Runtime};
//!
//! fn main() -> Result<()> {
//!     let runtime = Runtime::new(MockApi::new());
//!     for device in DeviceSelector::new().select(&runtime)? {
//!         println!("{} ({:?})", device.name()?, device.device_type()?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `opencl` - Load the system OpenCL ICD loader with `libloading`
//!   ([`Runtime::opencl`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod buffer;
pub mod classify;
pub mod context;
pub mod device;
pub mod dtype;
pub mod enqueue;
pub mod error;
pub mod event;
pub mod handle;
pub mod kernel;
pub mod logging;
pub mod memory;
pub mod mock;
pub mod platform;
pub mod program;
pub mod query;
pub mod queue;
pub mod session;
pub mod sys;
pub mod traits;

#[cfg(feature = "opencl")]
pub mod opencl;

// Re-exports for convenience
pub use api::{InfoTarget, NativeApi, Runtime};
pub use buffer::{Buffer, MemFlags};
pub use context::Context;
pub use device::{Device, DeviceSelector, DeviceType};
pub use dtype::Element;
pub use enqueue::{PendingRead, PendingWrite};
pub use error::{Error, ErrorKind, Result};
pub use event::{
    wait_for_events, CommandType, Event, ExecutionStatus, ProfilingInfo, ProfilingTimes,
    UserEvent,
};
pub use handle::Scoped;
pub use kernel::{Kernel, KernelArg, LocalMemory};
pub use logging::{init_logging, LogConfig, LogLevel};
pub use platform::{get_platforms, Platform};
pub use program::{BuildStatus, Program};
pub use query::NameVersion;
pub use queue::{CommandQueue, QueueProperties};
pub use session::{Session, SessionConfig};
pub use sys::{RawHandle, Status};
pub use traits::{RefCounted, ValidatableConfig};

#[cfg(feature = "opencl")]
pub use opencl::OpenClApi;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
