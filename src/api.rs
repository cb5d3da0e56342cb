// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! The native runtime boundary.
//!
//! [`NativeApi`] is a 1:1 image of the C entry points this crate wraps. Every
//! method returns the raw [`Status`] the runtime produced; nothing here
//! classifies, retries or allocates on the caller's behalf. Argument order and
//! units follow the C signatures, so offsets and sizes are **bytes**.
//!
//! Two implementations ship with the crate:
//!
//! - [`crate::mock::MockApi`] - deterministic in-process runtime, always available
//! - `crate::opencl::OpenClApi` - the system ICD loader (feature `opencl`)
//!
//! Wrapper types hold a [`Runtime`], which is a cheap clone of a shared
//! `Arc<dyn NativeApi>`.

use std::ffi::CStr;
use std::fmt;
use std::sync::Arc;

use crate::sys::{ObjectKind, RawHandle, Status};

/// Object (and for build info, object pair) an info query is addressed to.
///
/// Each variant corresponds to one `clGet*Info` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoTarget {
    /// `clGetPlatformInfo`
    Platform(RawHandle),
    /// `clGetDeviceInfo`
    Device(RawHandle),
    /// `clGetContextInfo`
    Context(RawHandle),
    /// `clGetCommandQueueInfo`
    CommandQueue(RawHandle),
    /// `clGetMemObjectInfo`
    Mem(RawHandle),
    /// `clGetProgramInfo`
    Program(RawHandle),
    /// `clGetProgramBuildInfo`
    ProgramBuild {
        /// Program handle.
        program: RawHandle,
        /// Device the build info refers to.
        device: RawHandle,
    },
    /// `clGetKernelInfo`
    Kernel(RawHandle),
    /// `clGetEventInfo`
    Event(RawHandle),
    /// `clGetEventProfilingInfo`
    EventProfiling(RawHandle),
}

impl InfoTarget {
    /// Target for the generic info query of a reference-counted object.
    #[must_use]
    pub fn for_object(kind: ObjectKind, handle: RawHandle) -> Self {
        match kind {
            ObjectKind::Platform => Self::Platform(handle),
            ObjectKind::Device => Self::Device(handle),
            ObjectKind::Context => Self::Context(handle),
            ObjectKind::CommandQueue => Self::CommandQueue(handle),
            ObjectKind::Program => Self::Program(handle),
            ObjectKind::Kernel => Self::Kernel(handle),
            ObjectKind::Mem => Self::Mem(handle),
            ObjectKind::Event => Self::Event(handle),
        }
    }
}

/// Native compute-runtime entry points.
///
/// Creation entry points return the new handle or the failing status; all
/// others return the status directly. Optional output parameters are `None`
/// where the C API accepts `NULL`.
///
/// Implementations must be callable from several threads at once; whatever
/// ordering the runtime guarantees between such calls is inherited unchanged.
pub trait NativeApi: Send + Sync + fmt::Debug {
    /// `clGetPlatformIDs`.
    fn get_platform_ids(
        &self,
        entries: Option<&mut [RawHandle]>,
        num_platforms: Option<&mut u32>,
    ) -> Status;

    /// `clGetDeviceIDs`.
    fn get_device_ids(
        &self,
        platform: RawHandle,
        device_type: u64,
        entries: Option<&mut [RawHandle]>,
        num_devices: Option<&mut u32>,
    ) -> Status;

    /// Every `clGet*Info` entry point, routed by `target`.
    ///
    /// `value` is the destination (its length is `param_value_size`);
    /// `size_ret` receives the number of bytes the full result occupies.
    fn get_info(
        &self,
        target: InfoTarget,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status;

    /// `clCreateContext`. `properties` is zero-terminated.
    fn create_context(
        &self,
        properties: &[isize],
        devices: &[RawHandle],
    ) -> Result<RawHandle, Status>;

    /// `clRetain*` for the given object kind.
    fn retain(&self, kind: ObjectKind, handle: RawHandle) -> Status;

    /// `clRelease*` for the given object kind.
    fn release(&self, kind: ObjectKind, handle: RawHandle) -> Status;

    /// `clCreateCommandQueueWithProperties`. `properties` is zero-terminated.
    fn create_command_queue(
        &self,
        context: RawHandle,
        device: RawHandle,
        properties: &[u64],
    ) -> Result<RawHandle, Status>;

    /// `clCreateProgramWithSource`; each fragment carries its own length.
    fn create_program_with_source(
        &self,
        context: RawHandle,
        sources: &[&[u8]],
    ) -> Result<RawHandle, Status>;

    /// `clCreateProgramWithIL`.
    fn create_program_with_il(&self, context: RawHandle, il: &[u8]) -> Result<RawHandle, Status>;

    /// `clBuildProgram` (synchronous, no notification callback).
    fn build_program(&self, program: RawHandle, devices: &[RawHandle], options: &CStr) -> Status;

    /// `clCreateKernel`.
    fn create_kernel(&self, program: RawHandle, name: &CStr) -> Result<RawHandle, Status>;

    /// `clSetKernelArg`. `value` is `None` for local-memory arguments.
    fn set_kernel_arg(
        &self,
        kernel: RawHandle,
        index: u32,
        size: usize,
        value: Option<&[u8]>,
    ) -> Status;

    /// `clCreateBuffer`. `host` is the `host_ptr`; its length must equal `size`.
    fn create_buffer(
        &self,
        context: RawHandle,
        flags: u64,
        size: usize,
        host: Option<&[u8]>,
    ) -> Result<RawHandle, Status>;

    /// `clEnqueueNDRangeKernel`.
    #[allow(clippy::too_many_arguments)]
    fn enqueue_nd_range_kernel(
        &self,
        queue: RawHandle,
        kernel: RawHandle,
        global_offset: Option<&[usize]>,
        global_size: &[usize],
        local_size: Option<&[usize]>,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status;

    /// `clEnqueueReadBuffer`.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `size` bytes until the returned event
    /// reaches a terminal state (immediately if `blocking` is set).
    #[allow(clippy::too_many_arguments)]
    unsafe fn enqueue_read_buffer(
        &self,
        queue: RawHandle,
        buffer: RawHandle,
        blocking: bool,
        offset: usize,
        size: usize,
        dst: *mut u8,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status;

    /// `clEnqueueWriteBuffer`.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reads of `size` bytes, and must not be written,
    /// until the returned event reaches a terminal state.
    #[allow(clippy::too_many_arguments)]
    unsafe fn enqueue_write_buffer(
        &self,
        queue: RawHandle,
        buffer: RawHandle,
        blocking: bool,
        offset: usize,
        size: usize,
        src: *const u8,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status;

    /// `clEnqueueCopyBuffer`.
    #[allow(clippy::too_many_arguments)]
    fn enqueue_copy_buffer(
        &self,
        queue: RawHandle,
        src: RawHandle,
        dst: RawHandle,
        src_offset: usize,
        dst_offset: usize,
        size: usize,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status;

    /// `clEnqueueMarkerWithWaitList`.
    fn enqueue_marker(
        &self,
        queue: RawHandle,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status;

    /// `clFinish`.
    fn finish(&self, queue: RawHandle) -> Status;

    /// `clFlush`.
    fn flush(&self, queue: RawHandle) -> Status;

    /// `clWaitForEvents`.
    fn wait_for_events(&self, events: &[RawHandle]) -> Status;

    /// `clCreateUserEvent`.
    fn create_user_event(&self, context: RawHandle) -> Result<RawHandle, Status>;

    /// `clSetUserEventStatus`.
    fn set_user_event_status(&self, event: RawHandle, execution_status: i32) -> Status;
}

/// Shared handle to a [`NativeApi`] implementation.
///
/// Every wrapper object keeps one, so objects from different runtimes can
/// coexist in a process (e.g. a mock next to the system loader).
#[derive(Clone)]
pub struct Runtime {
    api: Arc<dyn NativeApi>,
}

impl Runtime {
    /// Wrap a native implementation.
    pub fn new<A: NativeApi + 'static>(api: A) -> Self {
        Self { api: Arc::new(api) }
    }

    /// Wrap an already shared implementation.
    #[must_use]
    pub fn from_arc(api: Arc<dyn NativeApi>) -> Self {
        Self { api }
    }

    /// Load the system OpenCL ICD loader.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Unavailable`] when no loader library can be opened
    /// or it lacks a required entry point.
    #[cfg(feature = "opencl")]
    pub fn opencl() -> crate::error::Result<Self> {
        Ok(Self::new(crate::opencl::OpenClApi::load()?))
    }

    /// The underlying entry points.
    #[must_use]
    pub fn api(&self) -> &dyn NativeApi {
        &*self.api
    }

    /// Whether two runtimes dispatch to the same implementation.
    #[must_use]
    pub fn same_as(&self, other: &Runtime) -> bool {
        Arc::ptr_eq(&self.api, &other.api)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Runtime").field(&self.api).finish()
    }
}
