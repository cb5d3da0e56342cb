// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Programs: creation from source or IL, building, build diagnostics.
//!
//! A build failure is reported as [`ErrorKind::BuildProgramFailure`] without
//! the log attached; fetch it with [`Program::build_log`] for each device.
//!
//! ```rust
//! use rust_cl_core::mock::MockApi;
//! use rust_cl_core::{get_platforms, Context, DeviceType, ErrorKind, Program, RefCounted, Runtime};
//!
//! let runtime = Runtime::new(MockApi::new());
//! let platform = &get_platforms(&runtime)?[0];
//! let device = &platform.devices(DeviceType::ALL_COMPUTE)?[0];
//! let context = Context::create(&[device], None)?.scoped();
//!
//! let program = Program::create_with_source(&context, "__kernel void f(__global int* x) { x[0] = 1; ")?
//!     .scoped();
//! let err = program.build(&[device], "").unwrap_err();
//! assert_eq!(err.kind(), Some(ErrorKind::BuildProgramFailure));
//! assert!(!program.build_log(device)?.is_empty());
//! # Ok::<(), rust_cl_core::Error>(())
//! ```
//!
//! [`ErrorKind::BuildProgramFailure`]: crate::ErrorKind::BuildProgramFailure

use std::ffi::CString;

use crate::api::{InfoTarget, Runtime};
use crate::classify::{ops, require, violated};
use crate::context::Context;
use crate::device::Device;
use crate::error::Result;
use crate::query::InfoRequest;
use crate::sys::{build_status, program_build_info, program_info, ObjectKind, RawHandle};
use crate::traits::{impl_ref_counted, RefCounted};

/// Outcome of the last build for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Built successfully.
    Success,
    /// Never built.
    None,
    /// The last build failed.
    Error,
    /// A build is running.
    InProgress,
    /// A value this crate does not name.
    Other(i32),
}

impl From<i32> for BuildStatus {
    fn from(raw: i32) -> Self {
        match raw {
            build_status::SUCCESS => Self::Success,
            build_status::NONE => Self::None,
            build_status::ERROR => Self::Error,
            build_status::IN_PROGRESS => Self::InProgress,
            other => Self::Other(other),
        }
    }
}

/// A compilation unit bound to a context.
pub struct Program {
    runtime: Runtime,
    raw: RawHandle,
}

impl_ref_counted!(Program, ObjectKind::Program);

impl Program {
    /// Create from one source string.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn create_with_source(context: &Context, source: &str) -> Result<Self> {
        Self::create_with_sources(context, &[source.as_bytes()])
    }

    /// Create from several source fragments, each passed with its length.
    ///
    /// Fragments may contain NUL bytes.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    ///
    /// # Panics
    ///
    /// If `sources` is empty.
    pub fn create_with_sources(context: &Context, sources: &[&[u8]]) -> Result<Self> {
        require!(
            !sources.is_empty(),
            ops::CREATE_PROGRAM_WITH_SOURCE.name(),
            "no source fragments"
        );
        let runtime = context.runtime().clone();
        let raw = runtime
            .api()
            .create_program_with_source(context.as_raw(), sources)
            .map_err(|status| ops::CREATE_PROGRAM_WITH_SOURCE.fail(status))?;
        tracing::debug!(program = ?raw, fragments = sources.len(), "program created from source");
        Ok(Self { runtime, raw })
    }

    /// Create from an intermediate representation such as SPIR-V.
    ///
    /// # Errors
    ///
    /// `InvalidIl` if the runtime rejects the module, `InvalidOperation` if no
    /// device in the context accepts IL, or resource and host allocation failures.
    ///
    /// # Panics
    ///
    /// If `il` is empty.
    pub fn create_with_il(context: &Context, il: &[u8]) -> Result<Self> {
        require!(
            !il.is_empty(),
            ops::CREATE_PROGRAM_WITH_IL.name(),
            "intermediate representation is empty"
        );
        let runtime = context.runtime().clone();
        let raw = runtime
            .api()
            .create_program_with_il(context.as_raw(), il)
            .map_err(|status| ops::CREATE_PROGRAM_WITH_IL.fail(status))?;
        tracing::debug!(program = ?raw, bytes = il.len(), "program created from IL");
        Ok(Self { runtime, raw })
    }

    /// Compile and link for `devices` with the given build options.
    ///
    /// # Errors
    ///
    /// `BuildProgramFailure` (see [`Program::build_log`]), `CompilerNotAvailable`,
    /// `InvalidOperation`, or resource and host allocation failures.
    ///
    /// # Panics
    ///
    /// If `options` contains a NUL byte.
    pub fn build(&self, devices: &[&Device], options: &str) -> Result<()> {
        let Ok(options_c) = CString::new(options) else {
            violated(
                ops::BUILD_PROGRAM.name(),
                format_args!("build options contain a NUL byte"),
            )
        };
        let handles: Vec<RawHandle> = devices.iter().map(|d| d.as_raw()).collect();
        let status = self
            .runtime
            .api()
            .build_program(self.raw, &handles, &options_c);
        match ops::BUILD_PROGRAM.check(status) {
            Ok(()) => {
                tracing::info!(program = ?self.raw, options, "program built");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(program = ?self.raw, options, %err, "program build failed");
                Err(err)
            }
        }
    }

    fn build_info(&self, device: &Device, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(
            &self.runtime,
            InfoTarget::ProgramBuild {
                program: self.raw,
                device: device.as_raw(),
            },
            param,
        )
    }

    fn info(&self, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(&self.runtime, InfoTarget::Program(self.raw), param)
    }

    /// Compiler output of the last build for `device`.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn build_log(&self, device: &Device) -> Result<String> {
        self.build_info(device, program_build_info::LOG).string()
    }

    /// Status of the last build for `device`.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn build_status(&self, device: &Device) -> Result<BuildStatus> {
        Ok(self
            .build_info(device, program_build_info::STATUS)
            .scalar::<i32>()?
            .into())
    }

    /// Options of the last build for `device`.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn build_options(&self, device: &Device) -> Result<String> {
        self.build_info(device, program_build_info::OPTIONS).string()
    }

    /// Names of the kernels in the built program.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    ///
    /// # Panics
    ///
    /// If the program has not been built successfully.
    pub fn kernel_names(&self) -> Result<Vec<String>> {
        Ok(self
            .info(program_info::KERNEL_NAMES)
            .string()?
            .split(';')
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Number of kernels in the built program.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    ///
    /// # Panics
    ///
    /// If the program has not been built successfully.
    pub fn num_kernels(&self) -> Result<usize> {
        self.info(program_info::NUM_KERNELS).scalar()
    }

    /// Concatenated source text (empty for IL programs).
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn source(&self) -> Result<String> {
        self.info(program_info::SOURCE).string()
    }

    /// Owning context, as a new reference the caller must release.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn context(&self) -> Result<Context> {
        let raw = self.info(program_info::CONTEXT).scalar::<usize>()?;
        Context::retained(self.runtime.clone(), RawHandle::from_addr(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status_from_raw() {
        assert_eq!(BuildStatus::from(0), BuildStatus::Success);
        assert_eq!(BuildStatus::from(-1), BuildStatus::None);
        assert_eq!(BuildStatus::from(-2), BuildStatus::Error);
        assert_eq!(BuildStatus::from(-3), BuildStatus::InProgress);
        assert_eq!(BuildStatus::from(7), BuildStatus::Other(7));
    }
}
