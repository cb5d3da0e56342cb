// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Status classification.
//!
//! Every wrapped entry point has one [`Operation`]: its name plus a table that
//! maps each documented non-success status to an [`Outcome`]. One dispatch
//! routine ([`Operation::check`]) interprets the tables, so wrapping a new
//! entry point needs a new table and nothing else.
//!
//! Three ways out of a native call:
//!
//! | Status                          | Result                                   |
//! |---------------------------------|------------------------------------------|
//! | success                         | `Ok`                                     |
//! | [`Outcome::Fail`]               | `Err(Error::Runtime { kind, .. })`       |
//! | [`Outcome::Absent`]             | empty result (see [`Operation::check_present`]) |
//! | [`Outcome::Fatal`]              | panic: precondition violated             |
//! | not in the table                | panic: unclassified native status        |
//!
//! The two panics carry different messages so that a usage bug is never
//! confused with a binding that has drifted from the runtime it wraps.

use std::fmt;

use crate::error::{Error, ErrorKind, Result};
use crate::sys::{ObjectKind, Status};

/// Classification of one non-success status for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Expected absence of data (no platforms, no matching devices, no profiling info).
    Absent,
    /// A usage bug; the call path must not continue.
    Fatal,
    /// A recoverable error of the given kind.
    Fail(ErrorKind),
}

/// One wrapped native entry point and its status table.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    name: &'static str,
    table: &'static [(Status, Outcome)],
}

impl Operation {
    /// Define an operation.
    #[must_use]
    pub const fn new(name: &'static str, table: &'static [(Status, Outcome)]) -> Self {
        Self { name, table }
    }

    /// Native entry point name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The status table.
    #[must_use]
    pub fn table(&self) -> &'static [(Status, Outcome)] {
        self.table
    }

    /// Table lookup. `None` for success and for unlisted statuses.
    #[must_use]
    pub fn outcome(&self, status: Status) -> Option<Outcome> {
        self.table
            .iter()
            .find(|(listed, _)| *listed == status)
            .map(|(_, outcome)| *outcome)
    }

    /// Classify a status on a path where absence is a legal result.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` for [`Outcome::Absent`].
    ///
    /// # Errors
    ///
    /// Returns the recoverable error the table lists for `status`.
    ///
    /// # Panics
    ///
    /// On fatal and unclassified statuses.
    #[track_caller]
    pub fn check_present(&self, status: Status) -> Result<bool> {
        if status.is_success() {
            return Ok(true);
        }
        match self.outcome(status) {
            Some(Outcome::Absent) => Ok(false),
            Some(Outcome::Fail(kind)) => Err(Error::native(kind, self.name, status)),
            Some(Outcome::Fatal) => precondition_violated(self.name, status),
            None => unclassified_status(self.name, status),
        }
    }

    /// Classify a status on a path where absence is not a legal result.
    ///
    /// # Errors
    ///
    /// Returns the recoverable error the table lists for `status`.
    ///
    /// # Panics
    ///
    /// On fatal and unclassified statuses, and on [`Outcome::Absent`].
    #[track_caller]
    pub fn check(&self, status: Status) -> Result<()> {
        if self.check_present(status)? {
            Ok(())
        } else {
            unclassified_status(self.name, status)
        }
    }

    /// Error for the status of a failed creation call.
    ///
    /// Creation entry points report success through the returned handle, so a
    /// success status here means the runtime broke its own contract.
    ///
    /// # Panics
    ///
    /// On fatal and unclassified statuses.
    #[track_caller]
    pub fn fail(&self, status: Status) -> Error {
        match self.check(status) {
            Err(err) => err,
            Ok(()) => unclassified_status(self.name, status),
        }
    }
}

/// A native status says the caller broke a precondition.
#[cold]
#[track_caller]
pub fn precondition_violated(operation: &str, status: Status) -> ! {
    violated(operation, format_args!("native runtime reported {status}"))
}

/// A local precondition failed before the native call was made.
#[cold]
#[track_caller]
pub fn violated(operation: &str, detail: fmt::Arguments<'_>) -> ! {
    tracing::error!(operation, %detail, "precondition violated");
    panic!("{operation}: precondition violated: {detail}");
}

/// The runtime returned a status this operation has no classification for.
#[cold]
#[track_caller]
pub fn unclassified_status(operation: &str, status: Status) -> ! {
    tracing::error!(operation, %status, "unclassified native status");
    panic!("{operation}: unclassified native status {status}; binding out of sync with runtime");
}

/// Check a local precondition; panics through [`violated`] when it fails.
macro_rules! require {
    ($cond:expr, $operation:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::classify::violated($operation, format_args!($($arg)+))
        }
    };
}
pub(crate) use require;

/// Status tables, one per wrapped entry point.
pub mod ops {
    use super::Operation;
    use super::Outcome::{Absent, Fail, Fatal};
    use crate::error::ErrorKind::{
        BuildProgramFailure, CompilerNotAvailable, DeviceNotAvailable, ExecStatusErrorForEvents,
        InvalidIl, InvalidKernelDefinition, InvalidKernelName, InvalidOperation,
        OutOfDeviceMemory, OutOfHostMemory, OutOfResources, QueuePropertiesNotSupported,
    };
    use crate::sys::Status;

    macro_rules! operations {
        ($($ident:ident = $entry:literal { $($status:ident => $outcome:expr,)* })+) => {
            $(
                #[doc = concat!("Outcomes of `", $entry, "`.")]
                pub const $ident: Operation =
                    Operation::new($entry, &[$((Status::$status, $outcome),)*]);
            )+
        };
    }

    operations! {
        GET_PLATFORM_IDS = "clGetPlatformIDs" {
            PLATFORM_NOT_FOUND_KHR => Absent,
            INVALID_VALUE => Fatal,
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_DEVICE_IDS = "clGetDeviceIDs" {
            DEVICE_NOT_FOUND => Absent,
            INVALID_PLATFORM => Fatal,
            INVALID_DEVICE_TYPE => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_PLATFORM_INFO = "clGetPlatformInfo" {
            INVALID_PLATFORM => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_DEVICE_INFO = "clGetDeviceInfo" {
            INVALID_DEVICE => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_CONTEXT_INFO = "clGetContextInfo" {
            INVALID_CONTEXT => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_COMMAND_QUEUE_INFO = "clGetCommandQueueInfo" {
            INVALID_COMMAND_QUEUE => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_MEM_OBJECT_INFO = "clGetMemObjectInfo" {
            INVALID_MEM_OBJECT => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_PROGRAM_INFO = "clGetProgramInfo" {
            INVALID_PROGRAM => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_PROGRAM_EXECUTABLE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_PROGRAM_BUILD_INFO = "clGetProgramBuildInfo" {
            INVALID_DEVICE => Fatal,
            INVALID_PROGRAM => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_KERNEL_INFO = "clGetKernelInfo" {
            INVALID_KERNEL => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_EVENT_INFO = "clGetEventInfo" {
            INVALID_EVENT => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        GET_EVENT_PROFILING_INFO = "clGetEventProfilingInfo" {
            PROFILING_INFO_NOT_AVAILABLE => Absent,
            INVALID_EVENT => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        CREATE_CONTEXT = "clCreateContext" {
            INVALID_PLATFORM => Fatal,
            INVALID_PROPERTY => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_DEVICE => Fatal,
            DEVICE_NOT_AVAILABLE => Fail(DeviceNotAvailable),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        CREATE_COMMAND_QUEUE = "clCreateCommandQueueWithProperties" {
            INVALID_CONTEXT => Fatal,
            INVALID_DEVICE => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_QUEUE_PROPERTIES => Fail(QueuePropertiesNotSupported),
            INVALID_OPERATION => Fail(InvalidOperation),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        CREATE_PROGRAM_WITH_SOURCE = "clCreateProgramWithSource" {
            INVALID_CONTEXT => Fatal,
            INVALID_VALUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        CREATE_PROGRAM_WITH_IL = "clCreateProgramWithIL" {
            INVALID_CONTEXT => Fatal,
            INVALID_VALUE => Fail(InvalidIl),
            INVALID_OPERATION => Fail(InvalidOperation),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        BUILD_PROGRAM = "clBuildProgram" {
            INVALID_PROGRAM => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_DEVICE => Fatal,
            INVALID_BINARY => Fatal,
            INVALID_BUILD_OPTIONS => Fatal,
            COMPILER_NOT_AVAILABLE => Fail(CompilerNotAvailable),
            BUILD_PROGRAM_FAILURE => Fail(BuildProgramFailure),
            INVALID_OPERATION => Fail(InvalidOperation),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        CREATE_KERNEL = "clCreateKernel" {
            INVALID_PROGRAM => Fatal,
            INVALID_PROGRAM_EXECUTABLE => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_KERNEL_NAME => Fail(InvalidKernelName),
            INVALID_KERNEL_DEFINITION => Fail(InvalidKernelDefinition),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        SET_KERNEL_ARG = "clSetKernelArg" {
            INVALID_KERNEL => Fatal,
            INVALID_ARG_INDEX => Fatal,
            INVALID_ARG_VALUE => Fatal,
            INVALID_MEM_OBJECT => Fatal,
            INVALID_SAMPLER => Fatal,
            INVALID_ARG_SIZE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        CREATE_BUFFER = "clCreateBuffer" {
            INVALID_CONTEXT => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_HOST_PTR => Fatal,
            INVALID_BUFFER_SIZE => Fail(OutOfDeviceMemory),
            MEM_OBJECT_ALLOCATION_FAILURE => Fail(OutOfDeviceMemory),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        ENQUEUE_ND_RANGE_KERNEL = "clEnqueueNDRangeKernel" {
            INVALID_PROGRAM_EXECUTABLE => Fatal,
            INVALID_COMMAND_QUEUE => Fatal,
            INVALID_KERNEL => Fatal,
            INVALID_CONTEXT => Fatal,
            INVALID_KERNEL_ARGS => Fatal,
            INVALID_WORK_DIMENSION => Fatal,
            INVALID_GLOBAL_WORK_SIZE => Fatal,
            INVALID_GLOBAL_OFFSET => Fatal,
            INVALID_WORK_GROUP_SIZE => Fatal,
            INVALID_WORK_ITEM_SIZE => Fatal,
            MISALIGNED_SUB_BUFFER_OFFSET => Fatal,
            INVALID_EVENT_WAIT_LIST => Fatal,
            INVALID_VALUE => Fatal,
            MEM_OBJECT_ALLOCATION_FAILURE => Fail(OutOfDeviceMemory),
            INVALID_OPERATION => Fail(InvalidOperation),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        ENQUEUE_READ_BUFFER = "clEnqueueReadBuffer" {
            INVALID_COMMAND_QUEUE => Fatal,
            INVALID_CONTEXT => Fatal,
            INVALID_MEM_OBJECT => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_EVENT_WAIT_LIST => Fatal,
            MISALIGNED_SUB_BUFFER_OFFSET => Fatal,
            EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST => Fail(ExecStatusErrorForEvents),
            MEM_OBJECT_ALLOCATION_FAILURE => Fail(OutOfDeviceMemory),
            INVALID_OPERATION => Fail(InvalidOperation),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        ENQUEUE_WRITE_BUFFER = "clEnqueueWriteBuffer" {
            INVALID_COMMAND_QUEUE => Fatal,
            INVALID_CONTEXT => Fatal,
            INVALID_MEM_OBJECT => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_EVENT_WAIT_LIST => Fatal,
            MISALIGNED_SUB_BUFFER_OFFSET => Fatal,
            EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST => Fail(ExecStatusErrorForEvents),
            MEM_OBJECT_ALLOCATION_FAILURE => Fail(OutOfDeviceMemory),
            INVALID_OPERATION => Fail(InvalidOperation),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        ENQUEUE_COPY_BUFFER = "clEnqueueCopyBuffer" {
            INVALID_COMMAND_QUEUE => Fatal,
            INVALID_CONTEXT => Fatal,
            INVALID_MEM_OBJECT => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_EVENT_WAIT_LIST => Fatal,
            MISALIGNED_SUB_BUFFER_OFFSET => Fatal,
            MEM_COPY_OVERLAP => Fatal,
            MEM_OBJECT_ALLOCATION_FAILURE => Fail(OutOfDeviceMemory),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        ENQUEUE_MARKER = "clEnqueueMarkerWithWaitList" {
            INVALID_COMMAND_QUEUE => Fatal,
            INVALID_CONTEXT => Fatal,
            INVALID_EVENT_WAIT_LIST => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        FINISH = "clFinish" {
            INVALID_COMMAND_QUEUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        FLUSH = "clFlush" {
            INVALID_COMMAND_QUEUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        WAIT_FOR_EVENTS = "clWaitForEvents" {
            INVALID_VALUE => Fatal,
            INVALID_CONTEXT => Fatal,
            INVALID_EVENT => Fatal,
            EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST => Fail(ExecStatusErrorForEvents),
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        CREATE_USER_EVENT = "clCreateUserEvent" {
            INVALID_CONTEXT => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        SET_USER_EVENT_STATUS = "clSetUserEventStatus" {
            INVALID_EVENT => Fatal,
            INVALID_VALUE => Fatal,
            INVALID_OPERATION => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        RETAIN_CONTEXT = "clRetainContext" {
            INVALID_CONTEXT => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        RETAIN_COMMAND_QUEUE = "clRetainCommandQueue" {
            INVALID_COMMAND_QUEUE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        RETAIN_PROGRAM = "clRetainProgram" {
            INVALID_PROGRAM => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        RETAIN_KERNEL = "clRetainKernel" {
            INVALID_KERNEL => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        RETAIN_MEM_OBJECT = "clRetainMemObject" {
            INVALID_MEM_OBJECT => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        RETAIN_EVENT = "clRetainEvent" {
            INVALID_EVENT => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
        RETAIN_DEVICE = "clRetainDevice" {
            INVALID_DEVICE => Fatal,
            OUT_OF_RESOURCES => Fail(OutOfResources),
            OUT_OF_HOST_MEMORY => Fail(OutOfHostMemory),
        }
    }
}

/// Status table for the info query addressed to `target`.
#[must_use]
pub fn info_operation(target: &crate::api::InfoTarget) -> &'static Operation {
    use crate::api::InfoTarget;
    match target {
        InfoTarget::Platform(_) => &ops::GET_PLATFORM_INFO,
        InfoTarget::Device(_) => &ops::GET_DEVICE_INFO,
        InfoTarget::Context(_) => &ops::GET_CONTEXT_INFO,
        InfoTarget::CommandQueue(_) => &ops::GET_COMMAND_QUEUE_INFO,
        InfoTarget::Mem(_) => &ops::GET_MEM_OBJECT_INFO,
        InfoTarget::Program(_) => &ops::GET_PROGRAM_INFO,
        InfoTarget::ProgramBuild { .. } => &ops::GET_PROGRAM_BUILD_INFO,
        InfoTarget::Kernel(_) => &ops::GET_KERNEL_INFO,
        InfoTarget::Event(_) => &ops::GET_EVENT_INFO,
        InfoTarget::EventProfiling(_) => &ops::GET_EVENT_PROFILING_INFO,
    }
}

/// Status table for `clRetain*` on the given kind.
///
/// Platforms are not reference counted; retaining one is a usage bug.
#[must_use]
#[track_caller]
pub fn retain_operation(kind: ObjectKind) -> &'static Operation {
    match kind {
        ObjectKind::Context => &ops::RETAIN_CONTEXT,
        ObjectKind::CommandQueue => &ops::RETAIN_COMMAND_QUEUE,
        ObjectKind::Program => &ops::RETAIN_PROGRAM,
        ObjectKind::Kernel => &ops::RETAIN_KERNEL,
        ObjectKind::Mem => &ops::RETAIN_MEM_OBJECT,
        ObjectKind::Event => &ops::RETAIN_EVENT,
        ObjectKind::Device => &ops::RETAIN_DEVICE,
        ObjectKind::Platform => violated("clRetain", format_args!("platforms are not reference counted")),
    }
}

/// Name of the `clRelease*` entry point for `kind`, for log messages.
#[must_use]
pub fn release_name(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Context => "clReleaseContext",
        ObjectKind::CommandQueue => "clReleaseCommandQueue",
        ObjectKind::Program => "clReleaseProgram",
        ObjectKind::Kernel => "clReleaseKernel",
        ObjectKind::Mem => "clReleaseMemObject",
        ObjectKind::Event => "clReleaseEvent",
        ObjectKind::Device => "clReleaseDevice",
        ObjectKind::Platform => "clReleasePlatform",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_ok() {
        assert!(ops::BUILD_PROGRAM.check(Status::SUCCESS).is_ok());
        assert_eq!(ops::GET_DEVICE_IDS.check_present(Status::SUCCESS), Ok(true));
    }

    #[test]
    fn test_recoverable_keeps_status() {
        let err = ops::BUILD_PROGRAM
            .check(Status::BUILD_PROGRAM_FAILURE)
            .unwrap_err();
        assert!(err.is_build_failure());
        assert_eq!(err.status(), Some(Status::BUILD_PROGRAM_FAILURE));
    }

    #[test]
    fn test_absent_outcome() {
        assert_eq!(
            ops::GET_DEVICE_IDS.check_present(Status::DEVICE_NOT_FOUND),
            Ok(false)
        );
        assert_eq!(
            ops::GET_PLATFORM_IDS.check_present(Status::PLATFORM_NOT_FOUND_KHR),
            Ok(false)
        );
    }

    #[test]
    fn test_missing_queue_constructor_is_classified() {
        let err = ops::CREATE_COMMAND_QUEUE.fail(Status::INVALID_OPERATION);
        assert_eq!(err.kind(), Some(ErrorKind::InvalidOperation));
        assert_eq!(err.status(), Some(Status::INVALID_OPERATION));
    }

    #[test]
    #[should_panic(expected = "precondition violated")]
    fn test_fatal_panics() {
        let _ = ops::CREATE_KERNEL.check(Status::INVALID_PROGRAM);
    }

    #[test]
    #[should_panic(expected = "unclassified native status")]
    fn test_unlisted_status_panics() {
        let _ = ops::FINISH.check(Status::BUILD_PROGRAM_FAILURE);
    }

    #[test]
    #[should_panic(expected = "unclassified native status")]
    fn test_absent_where_not_allowed_panics() {
        let _ = ops::GET_DEVICE_IDS.check(Status::DEVICE_NOT_FOUND);
    }

    #[test]
    fn test_tables_never_list_success() {
        let all = [
            ops::GET_PLATFORM_IDS,
            ops::GET_DEVICE_IDS,
            ops::CREATE_CONTEXT,
            ops::CREATE_BUFFER,
            ops::BUILD_PROGRAM,
            ops::ENQUEUE_ND_RANGE_KERNEL,
            ops::WAIT_FOR_EVENTS,
        ];
        for op in all {
            assert!(op.table().iter().all(|(s, _)| !s.is_success()), "{}", op.name());
        }
    }

    #[test]
    fn test_buffer_size_is_allocation_failure() {
        let err = ops::CREATE_BUFFER
            .check(Status::INVALID_BUFFER_SIZE)
            .unwrap_err();
        assert!(err.is_allocation_failure());
    }
}
