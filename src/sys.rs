// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Native ABI numeric space.
//!
//! Everything in this module mirrors the numeric values of the OpenCL C headers
//! exactly: status codes, object kinds, info selectors, command types and
//! execution statuses. Nothing here allocates or calls into the runtime.

use std::ffi::c_void;
use std::fmt;

/// Native status code (`cl_int`) returned by every runtime entry point.
///
/// Zero is success; negative values are errors. The numeric value is preserved
/// end-to-end so that diagnostics always show what the runtime actually said.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Status(pub i32);

macro_rules! statuses {
    ($($name:ident = $value:literal,)+) => {
        impl Status {
            $(
                #[allow(missing_docs)]
                pub const $name: Status = Status($value);
            )+

            /// Symbolic name of the status, e.g. `CL_INVALID_VALUE`.
            #[must_use]
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(concat!("CL_", stringify!($name))),)+
                    _ => None,
                }
            }
        }
    };
}

statuses! {
    SUCCESS = 0,
    DEVICE_NOT_FOUND = -1,
    DEVICE_NOT_AVAILABLE = -2,
    COMPILER_NOT_AVAILABLE = -3,
    MEM_OBJECT_ALLOCATION_FAILURE = -4,
    OUT_OF_RESOURCES = -5,
    OUT_OF_HOST_MEMORY = -6,
    PROFILING_INFO_NOT_AVAILABLE = -7,
    MEM_COPY_OVERLAP = -8,
    IMAGE_FORMAT_MISMATCH = -9,
    IMAGE_FORMAT_NOT_SUPPORTED = -10,
    BUILD_PROGRAM_FAILURE = -11,
    MAP_FAILURE = -12,
    MISALIGNED_SUB_BUFFER_OFFSET = -13,
    EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST = -14,
    COMPILE_PROGRAM_FAILURE = -15,
    LINKER_NOT_AVAILABLE = -16,
    LINK_PROGRAM_FAILURE = -17,
    DEVICE_PARTITION_FAILED = -18,
    KERNEL_ARG_INFO_NOT_AVAILABLE = -19,
    INVALID_VALUE = -30,
    INVALID_DEVICE_TYPE = -31,
    INVALID_PLATFORM = -32,
    INVALID_DEVICE = -33,
    INVALID_CONTEXT = -34,
    INVALID_QUEUE_PROPERTIES = -35,
    INVALID_COMMAND_QUEUE = -36,
    INVALID_HOST_PTR = -37,
    INVALID_MEM_OBJECT = -38,
    INVALID_IMAGE_FORMAT_DESCRIPTOR = -39,
    INVALID_IMAGE_SIZE = -40,
    INVALID_SAMPLER = -41,
    INVALID_BINARY = -42,
    INVALID_BUILD_OPTIONS = -43,
    INVALID_PROGRAM = -44,
    INVALID_PROGRAM_EXECUTABLE = -45,
    INVALID_KERNEL_NAME = -46,
    INVALID_KERNEL_DEFINITION = -47,
    INVALID_KERNEL = -48,
    INVALID_ARG_INDEX = -49,
    INVALID_ARG_VALUE = -50,
    INVALID_ARG_SIZE = -51,
    INVALID_KERNEL_ARGS = -52,
    INVALID_WORK_DIMENSION = -53,
    INVALID_WORK_GROUP_SIZE = -54,
    INVALID_WORK_ITEM_SIZE = -55,
    INVALID_GLOBAL_OFFSET = -56,
    INVALID_EVENT_WAIT_LIST = -57,
    INVALID_EVENT = -58,
    INVALID_OPERATION = -59,
    INVALID_GL_OBJECT = -60,
    INVALID_BUFFER_SIZE = -61,
    INVALID_MIP_LEVEL = -62,
    INVALID_GLOBAL_WORK_SIZE = -63,
    INVALID_PROPERTY = -64,
    INVALID_IMAGE_DESCRIPTOR = -65,
    INVALID_COMPILER_OPTIONS = -66,
    INVALID_LINKER_OPTIONS = -67,
    INVALID_DEVICE_PARTITION_COUNT = -68,
    INVALID_PIPE_SIZE = -69,
    INVALID_DEVICE_QUEUE = -70,
    INVALID_SPEC_ID = -71,
    MAX_SIZE_RESTRICTION_EXCEEDED = -72,
    PLATFORM_NOT_FOUND_KHR = -1001,
}

impl Status {
    /// Whether this is `CL_SUCCESS`.
    #[must_use]
    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "status {}", self.0),
        }
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Opaque native handle (`cl_platform_id`, `cl_context`, `cl_mem`, ...).
///
/// The pointer is never dereferenced by this crate; it is only handed back to
/// the runtime that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawHandle(pub *mut c_void);

// SAFETY: handles are opaque tokens interpreted only by the native runtime,
// which defines its own thread-safety rules for the objects behind them.
unsafe impl Send for RawHandle {}
// SAFETY: see above; sharing the token value does not touch the object.
unsafe impl Sync for RawHandle {}

impl RawHandle {
    /// The null handle.
    pub const NULL: RawHandle = RawHandle(std::ptr::null_mut());

    /// Whether this is the null handle.
    #[must_use]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Build a handle from an integer token.
    #[must_use]
    pub fn from_addr(addr: usize) -> Self {
        Self(addr as *mut c_void)
    }

    /// Integer value of the handle.
    #[must_use]
    pub fn addr(self) -> usize {
        self.0 as usize
    }

    /// Native-endian bytes of the handle, as passed for `cl_mem` kernel arguments.
    #[must_use]
    pub fn to_ne_bytes(self) -> [u8; std::mem::size_of::<usize>()] {
        self.addr().to_ne_bytes()
    }
}

impl Default for RawHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({:#x})", self.addr())
    }
}

/// Kinds of native objects, used to route retain/release/info calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `cl_platform_id`
    Platform,
    /// `cl_device_id`
    Device,
    /// `cl_context`
    Context,
    /// `cl_command_queue`
    CommandQueue,
    /// `cl_program`
    Program,
    /// `cl_kernel`
    Kernel,
    /// `cl_mem`
    Mem,
    /// `cl_event`
    Event,
}

impl ObjectKind {
    /// Short name used in log messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Device => "device",
            Self::Context => "context",
            Self::CommandQueue => "command queue",
            Self::Program => "program",
            Self::Kernel => "kernel",
            Self::Mem => "buffer",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `CL_TRUE` / `CL_FALSE` as stored in `cl_bool` info results.
pub const CL_TRUE: u32 = 1;

/// Zero terminator for property lists.
pub const PROPERTIES_END: isize = 0;

/// `CL_CONTEXT_PLATFORM` context property.
pub const CONTEXT_PLATFORM: isize = 0x1084;

/// `CL_QUEUE_PROPERTIES` queue property key.
pub const QUEUE_PROPERTIES: u64 = 0x1093;

/// Fixed width of the name slot in a `cl_name_version` record.
pub const NAME_VERSION_MAX_NAME_SIZE: usize = 64;

/// Byte size of one `cl_name_version` record (`cl_version` + name slot).
pub const NAME_VERSION_RECORD_SIZE: usize = 4 + NAME_VERSION_MAX_NAME_SIZE;

/// Platform info selectors (`cl_platform_info`).
#[allow(missing_docs)]
pub mod platform_info {
    pub const PROFILE: u32 = 0x0900;
    pub const VERSION: u32 = 0x0901;
    pub const NAME: u32 = 0x0902;
    pub const VENDOR: u32 = 0x0903;
    pub const EXTENSIONS: u32 = 0x0904;
    pub const NUMERIC_VERSION: u32 = 0x0906;
    pub const EXTENSIONS_WITH_VERSION: u32 = 0x0907;
}

/// Device info selectors (`cl_device_info`).
#[allow(missing_docs)]
pub mod device_info {
    pub const TYPE: u32 = 0x1000;
    pub const VENDOR_ID: u32 = 0x1001;
    pub const MAX_COMPUTE_UNITS: u32 = 0x1002;
    pub const MAX_WORK_ITEM_DIMENSIONS: u32 = 0x1003;
    pub const MAX_WORK_GROUP_SIZE: u32 = 0x1004;
    pub const MAX_WORK_ITEM_SIZES: u32 = 0x1005;
    pub const MAX_CLOCK_FREQUENCY: u32 = 0x100C;
    pub const MAX_MEM_ALLOC_SIZE: u32 = 0x1010;
    pub const GLOBAL_MEM_SIZE: u32 = 0x101F;
    pub const LOCAL_MEM_SIZE: u32 = 0x1023;
    pub const PROFILING_TIMER_RESOLUTION: u32 = 0x1025;
    pub const AVAILABLE: u32 = 0x1027;
    pub const COMPILER_AVAILABLE: u32 = 0x1028;
    pub const NAME: u32 = 0x102B;
    pub const VENDOR: u32 = 0x102C;
    pub const DRIVER_VERSION: u32 = 0x102D;
    pub const PROFILE: u32 = 0x102E;
    pub const VERSION: u32 = 0x102F;
    pub const EXTENSIONS: u32 = 0x1030;
    pub const PLATFORM: u32 = 0x1031;
    pub const IL_VERSION: u32 = 0x105B;
    pub const NUMERIC_VERSION: u32 = 0x105E;
    pub const EXTENSIONS_WITH_VERSION: u32 = 0x1060;
}

/// Context info selectors (`cl_context_info`).
#[allow(missing_docs)]
pub mod context_info {
    pub const REFERENCE_COUNT: u32 = 0x1080;
    pub const DEVICES: u32 = 0x1081;
    pub const PROPERTIES: u32 = 0x1082;
    pub const NUM_DEVICES: u32 = 0x1083;
}

/// Command queue info selectors (`cl_command_queue_info`).
#[allow(missing_docs)]
pub mod queue_info {
    pub const CONTEXT: u32 = 0x1090;
    pub const DEVICE: u32 = 0x1091;
    pub const REFERENCE_COUNT: u32 = 0x1092;
    pub const PROPERTIES: u32 = 0x1093;
}

/// Memory object info selectors (`cl_mem_info`).
#[allow(missing_docs)]
pub mod mem_info {
    pub const TYPE: u32 = 0x1100;
    pub const FLAGS: u32 = 0x1101;
    pub const SIZE: u32 = 0x1102;
    pub const REFERENCE_COUNT: u32 = 0x1105;
    pub const CONTEXT: u32 = 0x1106;
}

/// Program info selectors (`cl_program_info`).
#[allow(missing_docs)]
pub mod program_info {
    pub const REFERENCE_COUNT: u32 = 0x1160;
    pub const CONTEXT: u32 = 0x1161;
    pub const NUM_DEVICES: u32 = 0x1162;
    pub const DEVICES: u32 = 0x1163;
    pub const SOURCE: u32 = 0x1164;
    pub const NUM_KERNELS: u32 = 0x1167;
    pub const KERNEL_NAMES: u32 = 0x1168;
    pub const IL: u32 = 0x1169;
}

/// Program build info selectors (`cl_program_build_info`).
#[allow(missing_docs)]
pub mod program_build_info {
    pub const STATUS: u32 = 0x1181;
    pub const OPTIONS: u32 = 0x1182;
    pub const LOG: u32 = 0x1183;
}

/// Kernel info selectors (`cl_kernel_info`).
#[allow(missing_docs)]
pub mod kernel_info {
    pub const FUNCTION_NAME: u32 = 0x1190;
    pub const NUM_ARGS: u32 = 0x1191;
    pub const REFERENCE_COUNT: u32 = 0x1192;
    pub const CONTEXT: u32 = 0x1193;
    pub const PROGRAM: u32 = 0x1194;
}

/// Event info selectors (`cl_event_info`).
#[allow(missing_docs)]
pub mod event_info {
    pub const COMMAND_QUEUE: u32 = 0x11D0;
    pub const COMMAND_TYPE: u32 = 0x11D1;
    pub const REFERENCE_COUNT: u32 = 0x11D2;
    pub const COMMAND_EXECUTION_STATUS: u32 = 0x11D3;
    pub const CONTEXT: u32 = 0x11D4;
}

/// Event profiling selectors (`cl_profiling_info`).
#[allow(missing_docs)]
pub mod profiling_info {
    pub const QUEUED: u32 = 0x1280;
    pub const SUBMIT: u32 = 0x1281;
    pub const START: u32 = 0x1282;
    pub const END: u32 = 0x1283;
    pub const COMPLETE: u32 = 0x1284;
}

/// Command types (`cl_command_type`).
#[allow(missing_docs)]
pub mod command_type {
    pub const NDRANGE_KERNEL: u32 = 0x11F0;
    pub const READ_BUFFER: u32 = 0x11F3;
    pub const WRITE_BUFFER: u32 = 0x11F4;
    pub const COPY_BUFFER: u32 = 0x11F5;
    pub const MARKER: u32 = 0x11FE;
    pub const USER: u32 = 0x1204;
}

/// Command execution statuses (`CL_COMPLETE` ... `CL_QUEUED`).
#[allow(missing_docs)]
pub mod execution_status {
    pub const COMPLETE: i32 = 0x0;
    pub const RUNNING: i32 = 0x1;
    pub const SUBMITTED: i32 = 0x2;
    pub const QUEUED: i32 = 0x3;
}

/// Program build statuses (`cl_build_status`).
#[allow(missing_docs)]
pub mod build_status {
    pub const SUCCESS: i32 = 0;
    pub const NONE: i32 = -1;
    pub const ERROR: i32 = -2;
    pub const IN_PROGRESS: i32 = -3;
}

/// Pack a `cl_version` (10-bit major, 10-bit minor, 12-bit patch).
#[must_use]
pub const fn make_version(major: u32, minor: u32, patch: u32) -> u32 {
    ((major & 0x3FF) << 22) | ((minor & 0x3FF) << 12) | (patch & 0xFFF)
}

/// Unpack a `cl_version` into `(major, minor, patch)`.
#[must_use]
pub const fn split_version(version: u32) -> (u32, u32, u32) {
    (version >> 22, (version >> 12) & 0x3FF, version & 0xFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        assert_eq!(Status::SUCCESS.name(), Some("CL_SUCCESS"));
        assert_eq!(Status::INVALID_VALUE.name(), Some("CL_INVALID_VALUE"));
        assert_eq!(Status(-9999).name(), None);
        assert_eq!(Status::BUILD_PROGRAM_FAILURE.to_string(), "CL_BUILD_PROGRAM_FAILURE (-11)");
        assert_eq!(Status(-9999).to_string(), "status -9999");
    }

    #[test]
    fn test_version_packing() {
        let v = make_version(3, 0, 14);
        assert_eq!(split_version(v), (3, 0, 14));
        assert_eq!(make_version(1, 2, 0), 0x0040_2000);
    }

    #[test]
    fn test_raw_handle_bytes() {
        let h = RawHandle::from_addr(0x40);
        assert_eq!(h.to_ne_bytes(), 0x40usize.to_ne_bytes());
        assert!(!h.is_null());
        assert!(RawHandle::NULL.is_null());
    }
}
