// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Recoverable error types for the binding layer.
//!
//! Only *recoverable* outcomes live here. Native statuses that indicate a usage
//! bug (invalid handle, invalid value, size mismatch) never become an `Error`;
//! they terminate the call path through [`crate::classify`] instead.
//!
//! ## Error Hierarchy
//!
//! ```text
//! Error
//! ├── Runtime            - a recoverable native outcome, tagged with an ErrorKind
//! │   ├── OutOfHostMemory          (host allocation, native or in this layer)
//! │   ├── OutOfDeviceMemory        (allocation on the accelerator)
//! │   ├── OutOfResources
//! │   ├── DeviceNotAvailable
//! │   ├── CompilerNotAvailable
//! │   ├── BuildProgramFailure
//! │   ├── InvalidKernelName / InvalidKernelDefinition
//! │   ├── InvalidIl
//! │   ├── InvalidOperation
//! │   ├── ExecStatusErrorForEvents
//! │   └── QueuePropertiesNotSupported
//! ├── InvalidConfig      - configuration validation failures
//! └── Unavailable        - no native runtime could be loaded
//! ```
//!
//! ## Branching on kind
//!
//! ```rust
//! use rust_cl_core::{Error, ErrorKind};
//!
//! fn describe(err: &Error) -> &'static str {
//!     match err.kind() {
//!         Some(ErrorKind::BuildProgramFailure) => "fetch the build log",
//!         Some(kind) if kind.is_allocation_failure() => "free something and retry",
//!         _ => "give up",
//!     }
//! }
//! # let _ = describe;
//! ```

use std::fmt;

use thiserror::Error;

use crate::sys::Status;

/// Result type alias for binding-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable error kinds reported by the native runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Host memory exhausted, in the runtime or while this layer allocated.
    OutOfHostMemory,
    /// Allocation on the device failed.
    OutOfDeviceMemory,
    /// Runtime-internal resource limits reached.
    OutOfResources,
    /// A device exists but cannot currently be used.
    DeviceNotAvailable,
    /// No compiler is available for the device.
    CompilerNotAvailable,
    /// Compilation or linking failed; the per-device build log has details.
    BuildProgramFailure,
    /// No kernel with the requested name exists in the built program.
    InvalidKernelName,
    /// The kernel's declared signature is not usable as an entry point.
    InvalidKernelDefinition,
    /// The intermediate representation was rejected.
    InvalidIl,
    /// The operation is not legal in the current state (e.g. host access flags).
    InvalidOperation,
    /// A command in the wait list terminated abnormally.
    ExecStatusErrorForEvents,
    /// Valid queue properties the device cannot honour.
    QueuePropertiesNotSupported,
}

impl ErrorKind {
    /// Human-readable description.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutOfHostMemory => "out of host memory",
            Self::OutOfDeviceMemory => "out of device memory",
            Self::OutOfResources => "out of resources",
            Self::DeviceNotAvailable => "device not available",
            Self::CompilerNotAvailable => "compiler not available",
            Self::BuildProgramFailure => "program build failure",
            Self::InvalidKernelName => "invalid kernel name",
            Self::InvalidKernelDefinition => "invalid kernel definition",
            Self::InvalidIl => "invalid intermediate representation",
            Self::InvalidOperation => "invalid operation",
            Self::ExecStatusErrorForEvents => "event in wait list terminated abnormally",
            Self::QueuePropertiesNotSupported => "queue properties not supported by device",
        }
    }

    /// Whether this kind belongs to the allocation-failure family.
    #[must_use]
    pub fn is_allocation_failure(self) -> bool {
        matches!(
            self,
            Self::OutOfHostMemory | Self::OutOfDeviceMemory | Self::OutOfResources
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a correct caller can encounter and handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A recoverable outcome of a native call.
    #[error("{operation}: {kind}{}", status_suffix(.status))]
    Runtime {
        /// What went wrong.
        kind: ErrorKind,
        /// Native entry point (or layer operation) that failed.
        operation: &'static str,
        /// Native status, absent when the failure originated in this layer.
        status: Option<Status>,
    },

    /// Invalid configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No native runtime could be loaded.
    #[error("compute runtime unavailable: {0}")]
    Unavailable(String),
}

fn status_suffix(status: &Option<Status>) -> String {
    match status {
        Some(status) => format!(" [{status}]"),
        None => String::new(),
    }
}

impl Error {
    /// Create a runtime error from a native status.
    #[must_use]
    pub fn native(kind: ErrorKind, operation: &'static str, status: Status) -> Self {
        Self::Runtime {
            kind,
            operation,
            status: Some(status),
        }
    }

    /// Host allocation failure inside this layer.
    ///
    /// Shares [`ErrorKind::OutOfHostMemory`] with the native host-memory status.
    #[must_use]
    pub fn host_allocation(operation: &'static str) -> Self {
        Self::Runtime {
            kind: ErrorKind::OutOfHostMemory,
            operation,
            status: None,
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a runtime-unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Kind of a runtime error, `None` for configuration/loading errors.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Runtime { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Native status behind the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Runtime { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this is an allocation failure (host, device or runtime resources).
    #[must_use]
    pub fn is_allocation_failure(&self) -> bool {
        self.kind().is_some_and(ErrorKind::is_allocation_failure)
    }

    /// Whether this is a program build failure.
    #[must_use]
    pub fn is_build_failure(&self) -> bool {
        self.kind() == Some(ErrorKind::BuildProgramFailure)
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::host_allocation("host allocation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::native(
            ErrorKind::BuildProgramFailure,
            "clBuildProgram",
            Status::BUILD_PROGRAM_FAILURE,
        );
        assert_eq!(
            err.to_string(),
            "clBuildProgram: program build failure [CL_BUILD_PROGRAM_FAILURE (-11)]"
        );

        let err = Error::host_allocation("clGetDeviceInfo");
        assert_eq!(err.to_string(), "clGetDeviceInfo: out of host memory");

        let err = Error::invalid_config("empty device mask");
        assert_eq!(err.to_string(), "invalid configuration: empty device mask");
    }

    #[test]
    fn test_host_oom_is_unified() {
        let native = Error::native(
            ErrorKind::OutOfHostMemory,
            "clCreateContext",
            Status::OUT_OF_HOST_MEMORY,
        );
        let layer = Error::host_allocation("query");
        assert_eq!(native.kind(), layer.kind());
        assert!(native.is_allocation_failure());
        assert!(layer.is_allocation_failure());
        assert_eq!(layer.status(), None);
    }

    #[test]
    fn test_error_conversion() {
        let mut v: Vec<u8> = Vec::new();
        let err: Error = v.try_reserve(usize::MAX).unwrap_err().into();
        assert_eq!(err.kind(), Some(ErrorKind::OutOfHostMemory));
    }

    #[test]
    fn test_kind_helpers() {
        assert!(ErrorKind::OutOfDeviceMemory.is_allocation_failure());
        assert!(!ErrorKind::InvalidOperation.is_allocation_failure());
        let err = Error::unavailable("no ICD loader");
        assert_eq!(err.kind(), None);
        assert!(!err.is_build_failure());
    }
}
