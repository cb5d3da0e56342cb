// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! System OpenCL runtime loaded at run time.
//!
//! Uses `libloading` to open the ICD loader (`libOpenCL.so.1` on Linux,
//! `OpenCL.dll` on Windows, the `OpenCL` framework on macOS) and resolves
//! every entry point once. Nothing links against OpenCL at build time, so a
//! binary built with the `opencl` feature still starts on a machine without
//! a driver and reports [`Error::Unavailable`] from [`OpenClApi::load`].
//!
//! Entry points newer than OpenCL 1.2 are optional:
//!
//! - `clCreateCommandQueueWithProperties` falls back to `clCreateCommandQueue`
//! - `clCreateProgramWithIL` missing makes IL programs fail with `CL_INVALID_OPERATION`
//! - `clRetainDevice` / `clReleaseDevice` missing are treated as no-ops (root devices)

use std::ffi::{c_char, c_void, CStr};
use std::fmt;
use std::ptr;

use libloading::{Library, Symbol};
use tracing::{debug, info};

use crate::api::{InfoTarget, NativeApi};
use crate::error::{Error, Result};
use crate::sys::{ObjectKind, RawHandle, Status, QUEUE_PROPERTIES};

type Handle = RawHandle;

type FnGetPlatformIds = unsafe extern "C" fn(u32, *mut Handle, *mut u32) -> i32;
type FnGetDeviceIds = unsafe extern "C" fn(Handle, u64, u32, *mut Handle, *mut u32) -> i32;
type FnGetInfo = unsafe extern "C" fn(Handle, u32, usize, *mut c_void, *mut usize) -> i32;
type FnGetBuildInfo =
    unsafe extern "C" fn(Handle, Handle, u32, usize, *mut c_void, *mut usize) -> i32;
type FnObject = unsafe extern "C" fn(Handle) -> i32;
type FnCreateContext = unsafe extern "C" fn(
    *const isize,
    u32,
    *const Handle,
    *const c_void,
    *mut c_void,
    *mut i32,
) -> Handle;
type FnCreateQueueWithProperties =
    unsafe extern "C" fn(Handle, Handle, *const u64, *mut i32) -> Handle;
type FnCreateQueue = unsafe extern "C" fn(Handle, Handle, u64, *mut i32) -> Handle;
type FnCreateProgramWithSource =
    unsafe extern "C" fn(Handle, u32, *const *const c_char, *const usize, *mut i32) -> Handle;
type FnCreateProgramWithIl =
    unsafe extern "C" fn(Handle, *const c_void, usize, *mut i32) -> Handle;
type FnBuildProgram = unsafe extern "C" fn(
    Handle,
    u32,
    *const Handle,
    *const c_char,
    *const c_void,
    *mut c_void,
) -> i32;
type FnCreateKernel = unsafe extern "C" fn(Handle, *const c_char, *mut i32) -> Handle;
type FnSetKernelArg = unsafe extern "C" fn(Handle, u32, usize, *const c_void) -> i32;
type FnCreateBuffer = unsafe extern "C" fn(Handle, u64, usize, *mut c_void, *mut i32) -> Handle;
type FnEnqueueNdRange = unsafe extern "C" fn(
    Handle,
    Handle,
    u32,
    *const usize,
    *const usize,
    *const usize,
    u32,
    *const Handle,
    *mut Handle,
) -> i32;
type FnEnqueueRead = unsafe extern "C" fn(
    Handle,
    Handle,
    u32,
    usize,
    usize,
    *mut c_void,
    u32,
    *const Handle,
    *mut Handle,
) -> i32;
type FnEnqueueWrite = unsafe extern "C" fn(
    Handle,
    Handle,
    u32,
    usize,
    usize,
    *const c_void,
    u32,
    *const Handle,
    *mut Handle,
) -> i32;
type FnEnqueueCopy = unsafe extern "C" fn(
    Handle,
    Handle,
    Handle,
    usize,
    usize,
    usize,
    u32,
    *const Handle,
    *mut Handle,
) -> i32;
type FnEnqueueMarker = unsafe extern "C" fn(Handle, u32, *const Handle, *mut Handle) -> i32;
type FnWaitForEvents = unsafe extern "C" fn(u32, *const Handle) -> i32;
type FnCreateUserEvent = unsafe extern "C" fn(Handle, *mut i32) -> Handle;
type FnSetUserEventStatus = unsafe extern "C" fn(Handle, i32) -> i32;

/// Entry points resolved from the ICD loader.
///
/// The library stays open for the lifetime of the value; the function
/// pointers are only valid while it does.
pub struct OpenClApi {
    _lib: Library,
    get_platform_ids: FnGetPlatformIds,
    get_device_ids: FnGetDeviceIds,
    get_platform_info: FnGetInfo,
    get_device_info: FnGetInfo,
    get_context_info: FnGetInfo,
    get_command_queue_info: FnGetInfo,
    get_mem_object_info: FnGetInfo,
    get_program_info: FnGetInfo,
    get_program_build_info: FnGetBuildInfo,
    get_kernel_info: FnGetInfo,
    get_event_info: FnGetInfo,
    get_event_profiling_info: FnGetInfo,
    create_context: FnCreateContext,
    retain_context: FnObject,
    release_context: FnObject,
    create_command_queue_with_properties: Option<FnCreateQueueWithProperties>,
    create_command_queue: Option<FnCreateQueue>,
    retain_command_queue: FnObject,
    release_command_queue: FnObject,
    create_program_with_source: FnCreateProgramWithSource,
    create_program_with_il: Option<FnCreateProgramWithIl>,
    build_program: FnBuildProgram,
    retain_program: FnObject,
    release_program: FnObject,
    create_kernel: FnCreateKernel,
    set_kernel_arg: FnSetKernelArg,
    retain_kernel: FnObject,
    release_kernel: FnObject,
    create_buffer: FnCreateBuffer,
    retain_mem_object: FnObject,
    release_mem_object: FnObject,
    enqueue_nd_range_kernel: FnEnqueueNdRange,
    enqueue_read_buffer: FnEnqueueRead,
    enqueue_write_buffer: FnEnqueueWrite,
    enqueue_copy_buffer: FnEnqueueCopy,
    enqueue_marker_with_wait_list: FnEnqueueMarker,
    finish: FnObject,
    flush: FnObject,
    wait_for_events: FnWaitForEvents,
    create_user_event: FnCreateUserEvent,
    set_user_event_status: FnSetUserEventStatus,
    retain_event: FnObject,
    release_event: FnObject,
    retain_device: Option<FnObject>,
    release_device: Option<FnObject>,
}

impl OpenClApi {
    /// Open the ICD loader and resolve its entry points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] if no loader library can be opened or a
    /// required OpenCL 1.2 entry point is missing.
    pub fn load() -> Result<Self> {
        let lib = Self::load_library()?;

        // SAFETY: each symbol is looked up by its OpenCL name and cast to the
        // signature the OpenCL headers declare for it.
        let api = unsafe {
            Self {
                get_platform_ids: Self::load_fn(&lib, "clGetPlatformIDs")?,
                get_device_ids: Self::load_fn(&lib, "clGetDeviceIDs")?,
                get_platform_info: Self::load_fn(&lib, "clGetPlatformInfo")?,
                get_device_info: Self::load_fn(&lib, "clGetDeviceInfo")?,
                get_context_info: Self::load_fn(&lib, "clGetContextInfo")?,
                get_command_queue_info: Self::load_fn(&lib, "clGetCommandQueueInfo")?,
                get_mem_object_info: Self::load_fn(&lib, "clGetMemObjectInfo")?,
                get_program_info: Self::load_fn(&lib, "clGetProgramInfo")?,
                get_program_build_info: Self::load_fn(&lib, "clGetProgramBuildInfo")?,
                get_kernel_info: Self::load_fn(&lib, "clGetKernelInfo")?,
                get_event_info: Self::load_fn(&lib, "clGetEventInfo")?,
                get_event_profiling_info: Self::load_fn(&lib, "clGetEventProfilingInfo")?,
                create_context: Self::load_fn(&lib, "clCreateContext")?,
                retain_context: Self::load_fn(&lib, "clRetainContext")?,
                release_context: Self::load_fn(&lib, "clReleaseContext")?,
                create_command_queue_with_properties: Self::load_fn_opt(
                    &lib,
                    "clCreateCommandQueueWithProperties",
                ),
                create_command_queue: Self::load_fn_opt(&lib, "clCreateCommandQueue"),
                retain_command_queue: Self::load_fn(&lib, "clRetainCommandQueue")?,
                release_command_queue: Self::load_fn(&lib, "clReleaseCommandQueue")?,
                create_program_with_source: Self::load_fn(&lib, "clCreateProgramWithSource")?,
                create_program_with_il: Self::load_fn_opt(&lib, "clCreateProgramWithIL"),
                build_program: Self::load_fn(&lib, "clBuildProgram")?,
                retain_program: Self::load_fn(&lib, "clRetainProgram")?,
                release_program: Self::load_fn(&lib, "clReleaseProgram")?,
                create_kernel: Self::load_fn(&lib, "clCreateKernel")?,
                set_kernel_arg: Self::load_fn(&lib, "clSetKernelArg")?,
                retain_kernel: Self::load_fn(&lib, "clRetainKernel")?,
                release_kernel: Self::load_fn(&lib, "clReleaseKernel")?,
                create_buffer: Self::load_fn(&lib, "clCreateBuffer")?,
                retain_mem_object: Self::load_fn(&lib, "clRetainMemObject")?,
                release_mem_object: Self::load_fn(&lib, "clReleaseMemObject")?,
                enqueue_nd_range_kernel: Self::load_fn(&lib, "clEnqueueNDRangeKernel")?,
                enqueue_read_buffer: Self::load_fn(&lib, "clEnqueueReadBuffer")?,
                enqueue_write_buffer: Self::load_fn(&lib, "clEnqueueWriteBuffer")?,
                enqueue_copy_buffer: Self::load_fn(&lib, "clEnqueueCopyBuffer")?,
                enqueue_marker_with_wait_list: Self::load_fn(
                    &lib,
                    "clEnqueueMarkerWithWaitList",
                )?,
                finish: Self::load_fn(&lib, "clFinish")?,
                flush: Self::load_fn(&lib, "clFlush")?,
                wait_for_events: Self::load_fn(&lib, "clWaitForEvents")?,
                create_user_event: Self::load_fn(&lib, "clCreateUserEvent")?,
                set_user_event_status: Self::load_fn(&lib, "clSetUserEventStatus")?,
                retain_event: Self::load_fn(&lib, "clRetainEvent")?,
                release_event: Self::load_fn(&lib, "clReleaseEvent")?,
                retain_device: Self::load_fn_opt(&lib, "clRetainDevice"),
                release_device: Self::load_fn_opt(&lib, "clReleaseDevice"),
                _lib: lib,
            }
        };

        if api.create_command_queue_with_properties.is_none() && api.create_command_queue.is_none()
        {
            return Err(Error::unavailable(
                "OpenCL loader exports no command queue constructor",
            ));
        }
        info!(
            il_programs = api.create_program_with_il.is_some(),
            "OpenCL loader ready"
        );
        Ok(api)
    }

    fn load_library() -> Result<Library> {
        #[cfg(target_os = "windows")]
        let lib_names: &[&str] = &["OpenCL.dll"];

        #[cfg(target_os = "macos")]
        let lib_names: &[&str] = &[
            "/System/Library/Frameworks/OpenCL.framework/OpenCL",
            "libOpenCL.dylib",
        ];

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let lib_names: &[&str] = &["libOpenCL.so.1", "libOpenCL.so"];

        let mut last_err = String::new();
        for name in lib_names {
            // SAFETY: loading the ICD loader runs its initializers, which is
            // the documented way to use it.
            match unsafe { Library::new(name) } {
                Ok(lib) => {
                    info!(library = name, "loaded OpenCL loader");
                    return Ok(lib);
                }
                Err(e) => {
                    last_err = format!("{name}: {e}");
                    debug!(library = name, error = %e, "failed to load OpenCL loader");
                }
            }
        }

        Err(Error::unavailable(format!(
            "failed to load OpenCL loader library: {last_err}"
        )))
    }

    unsafe fn load_fn<F: Copy>(lib: &Library, name: &str) -> Result<F> {
        let sym: Symbol<F> = lib
            .get(name.as_bytes())
            .map_err(|e| Error::unavailable(format!("failed to load {name}: {e}")))?;
        Ok(*sym)
    }

    unsafe fn load_fn_opt<F: Copy>(lib: &Library, name: &str) -> Option<F> {
        lib.get(name.as_bytes()).ok().map(|s: Symbol<F>| *s)
    }

    fn object_fns(&self, kind: ObjectKind) -> (Option<FnObject>, Option<FnObject>) {
        match kind {
            ObjectKind::Platform => (None, None),
            ObjectKind::Device => (self.retain_device, self.release_device),
            ObjectKind::Context => (Some(self.retain_context), Some(self.release_context)),
            ObjectKind::CommandQueue => (
                Some(self.retain_command_queue),
                Some(self.release_command_queue),
            ),
            ObjectKind::Program => (Some(self.retain_program), Some(self.release_program)),
            ObjectKind::Kernel => (Some(self.retain_kernel), Some(self.release_kernel)),
            ObjectKind::Mem => (Some(self.retain_mem_object), Some(self.release_mem_object)),
            ObjectKind::Event => (Some(self.retain_event), Some(self.release_event)),
        }
    }
}

impl fmt::Debug for OpenClApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenClApi")
            .field("il_programs", &self.create_program_with_il.is_some())
            .field(
                "queue_properties",
                &self.create_command_queue_with_properties.is_some(),
            )
            .finish_non_exhaustive()
    }
}

fn out_ptr<T>(value: Option<&mut T>) -> *mut T {
    value.map_or(ptr::null_mut(), |v| v as *mut T)
}

/// Length and pointer of an event wait list; OpenCL wants NULL for empty lists.
fn wait_list_parts(wait_list: &[RawHandle]) -> Option<(u32, *const Handle)> {
    let len = u32::try_from(wait_list.len()).ok()?;
    let ptr = if wait_list.is_empty() {
        ptr::null()
    } else {
        wait_list.as_ptr()
    };
    Some((len, ptr))
}

fn opt_slice_ptr(values: Option<&[usize]>) -> *const usize {
    values.map_or(ptr::null(), <[usize]>::as_ptr)
}

fn created(handle: Handle, status: i32) -> std::result::Result<RawHandle, Status> {
    if status == 0 && !handle.is_null() {
        Ok(handle)
    } else if status == 0 {
        Err(Status::OUT_OF_RESOURCES)
    } else {
        Err(Status(status))
    }
}

impl NativeApi for OpenClApi {
    fn get_platform_ids(
        &self,
        entries: Option<&mut [RawHandle]>,
        num_platforms: Option<&mut u32>,
    ) -> Status {
        let (len, dst) = match entries {
            Some(entries) => match u32::try_from(entries.len()) {
                Ok(len) => (len, entries.as_mut_ptr()),
                Err(_) => return Status::INVALID_VALUE,
            },
            None => (0, ptr::null_mut()),
        };
        // SAFETY: `dst` holds `len` handles or is null with `len == 0`.
        Status(unsafe { (self.get_platform_ids)(len, dst, out_ptr(num_platforms)) })
    }

    fn get_device_ids(
        &self,
        platform: RawHandle,
        device_type: u64,
        entries: Option<&mut [RawHandle]>,
        num_devices: Option<&mut u32>,
    ) -> Status {
        let (len, dst) = match entries {
            Some(entries) => match u32::try_from(entries.len()) {
                Ok(len) => (len, entries.as_mut_ptr()),
                Err(_) => return Status::INVALID_VALUE,
            },
            None => (0, ptr::null_mut()),
        };
        // SAFETY: as for `get_platform_ids`.
        Status(unsafe {
            (self.get_device_ids)(platform, device_type, len, dst, out_ptr(num_devices))
        })
    }

    fn get_info(
        &self,
        target: InfoTarget,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let (len, dst) = match value {
            Some(value) => (value.len(), value.as_mut_ptr().cast::<c_void>()),
            None => (0, ptr::null_mut()),
        };
        let size_ret = out_ptr(size_ret);
        let (f, handle) = match target {
            InfoTarget::ProgramBuild { program, device } => {
                // SAFETY: `dst` is valid for `len` bytes or null with zero length.
                return Status(unsafe {
                    (self.get_program_build_info)(program, device, param, len, dst, size_ret)
                });
            }
            InfoTarget::Platform(h) => (self.get_platform_info, h),
            InfoTarget::Device(h) => (self.get_device_info, h),
            InfoTarget::Context(h) => (self.get_context_info, h),
            InfoTarget::CommandQueue(h) => (self.get_command_queue_info, h),
            InfoTarget::Mem(h) => (self.get_mem_object_info, h),
            InfoTarget::Program(h) => (self.get_program_info, h),
            InfoTarget::Kernel(h) => (self.get_kernel_info, h),
            InfoTarget::Event(h) => (self.get_event_info, h),
            InfoTarget::EventProfiling(h) => (self.get_event_profiling_info, h),
        };
        // SAFETY: as above.
        Status(unsafe { f(handle, param, len, dst, size_ret) })
    }

    fn create_context(
        &self,
        properties: &[isize],
        devices: &[RawHandle],
    ) -> std::result::Result<RawHandle, Status> {
        let num = u32::try_from(devices.len()).map_err(|_| Status::INVALID_VALUE)?;
        let props = if properties.is_empty() {
            ptr::null()
        } else {
            properties.as_ptr()
        };
        let mut status = 0;
        // SAFETY: `props` is zero-terminated or null, `devices` holds `num`
        // handles, and no notification callback is registered.
        let handle = unsafe {
            (self.create_context)(
                props,
                num,
                devices.as_ptr(),
                ptr::null(),
                ptr::null_mut(),
                &mut status,
            )
        };
        created(handle, status)
    }

    fn retain(&self, kind: ObjectKind, handle: RawHandle) -> Status {
        match self.object_fns(kind).0 {
            // SAFETY: the handle came from this runtime.
            Some(f) => Status(unsafe { f(handle) }),
            None => Status::SUCCESS,
        }
    }

    fn release(&self, kind: ObjectKind, handle: RawHandle) -> Status {
        match self.object_fns(kind).1 {
            // SAFETY: the handle came from this runtime.
            Some(f) => Status(unsafe { f(handle) }),
            None => Status::SUCCESS,
        }
    }

    fn create_command_queue(
        &self,
        context: RawHandle,
        device: RawHandle,
        properties: &[u64],
    ) -> std::result::Result<RawHandle, Status> {
        let mut status = 0;
        if let Some(f) = self.create_command_queue_with_properties {
            // SAFETY: `properties` is zero-terminated.
            let handle = unsafe { f(context, device, properties.as_ptr(), &mut status) };
            return created(handle, status);
        }
        let Some(f) = self.create_command_queue else {
            return Err(Status::INVALID_OPERATION);
        };
        let bits = properties
            .chunks_exact(2)
            .take_while(|pair| pair[0] != 0)
            .find(|pair| pair[0] == QUEUE_PROPERTIES)
            .map_or(0, |pair| pair[1]);
        // SAFETY: plain values only.
        let handle = unsafe { f(context, device, bits, &mut status) };
        created(handle, status)
    }

    fn create_program_with_source(
        &self,
        context: RawHandle,
        sources: &[&[u8]],
    ) -> std::result::Result<RawHandle, Status> {
        let count = u32::try_from(sources.len()).map_err(|_| Status::INVALID_VALUE)?;
        let strings: Vec<*const c_char> =
            sources.iter().map(|s| s.as_ptr().cast::<c_char>()).collect();
        let lengths: Vec<usize> = sources.iter().map(|s| s.len()).collect();
        let mut status = 0;
        // SAFETY: each string pointer is valid for its length; explicit
        // lengths mean no NUL terminator is needed.
        let handle = unsafe {
            (self.create_program_with_source)(
                context,
                count,
                strings.as_ptr(),
                lengths.as_ptr(),
                &mut status,
            )
        };
        created(handle, status)
    }

    fn create_program_with_il(
        &self,
        context: RawHandle,
        il: &[u8],
    ) -> std::result::Result<RawHandle, Status> {
        let Some(f) = self.create_program_with_il else {
            return Err(Status::INVALID_OPERATION);
        };
        let mut status = 0;
        // SAFETY: `il` is valid for `il.len()` bytes.
        let handle = unsafe { f(context, il.as_ptr().cast(), il.len(), &mut status) };
        created(handle, status)
    }

    fn build_program(&self, program: RawHandle, devices: &[RawHandle], options: &CStr) -> Status {
        let Ok(num) = u32::try_from(devices.len()) else {
            return Status::INVALID_VALUE;
        };
        let list = if devices.is_empty() {
            ptr::null()
        } else {
            devices.as_ptr()
        };
        // SAFETY: synchronous build, no callback; `options` is NUL-terminated.
        Status(unsafe {
            (self.build_program)(
                program,
                num,
                list,
                options.as_ptr(),
                ptr::null(),
                ptr::null_mut(),
            )
        })
    }

    fn create_kernel(
        &self,
        program: RawHandle,
        name: &CStr,
    ) -> std::result::Result<RawHandle, Status> {
        let mut status = 0;
        // SAFETY: `name` is NUL-terminated.
        let handle = unsafe { (self.create_kernel)(program, name.as_ptr(), &mut status) };
        created(handle, status)
    }

    fn set_kernel_arg(
        &self,
        kernel: RawHandle,
        index: u32,
        size: usize,
        value: Option<&[u8]>,
    ) -> Status {
        let ptr = value.map_or(ptr::null(), |v| v.as_ptr().cast::<c_void>());
        // SAFETY: the runtime copies `size` bytes from `ptr` before returning.
        Status(unsafe { (self.set_kernel_arg)(kernel, index, size, ptr) })
    }

    fn create_buffer(
        &self,
        context: RawHandle,
        flags: u64,
        size: usize,
        host: Option<&[u8]>,
    ) -> std::result::Result<RawHandle, Status> {
        // COPY_HOST_PTR only reads through the pointer
        let host_ptr = host.map_or(ptr::null_mut(), |h| h.as_ptr().cast_mut().cast::<c_void>());
        let mut status = 0;
        // SAFETY: `host_ptr` is valid for `size` bytes when present.
        let handle = unsafe { (self.create_buffer)(context, flags, size, host_ptr, &mut status) };
        created(handle, status)
    }

    fn enqueue_nd_range_kernel(
        &self,
        queue: RawHandle,
        kernel: RawHandle,
        global_offset: Option<&[usize]>,
        global_size: &[usize],
        local_size: Option<&[usize]>,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status {
        let Ok(dims) = u32::try_from(global_size.len()) else {
            return Status::INVALID_WORK_DIMENSION;
        };
        let Some((num_events, events)) = wait_list_parts(wait_list) else {
            return Status::INVALID_EVENT_WAIT_LIST;
        };
        // SAFETY: every size array holds `dims` elements or is null.
        Status(unsafe {
            (self.enqueue_nd_range_kernel)(
                queue,
                kernel,
                dims,
                opt_slice_ptr(global_offset),
                global_size.as_ptr(),
                opt_slice_ptr(local_size),
                num_events,
                events,
                event,
            )
        })
    }

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
    ) -> Status {
        let Some((num_events, events)) = wait_list_parts(wait_list) else {
            return Status::INVALID_EVENT_WAIT_LIST;
        };
        // SAFETY: forwarded caller contract on `dst`.
        Status(unsafe {
            (self.enqueue_read_buffer)(
                queue,
                buffer,
                u32::from(blocking),
                offset,
                size,
                dst.cast(),
                num_events,
                events,
                event,
            )
        })
    }

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
    ) -> Status {
        let Some((num_events, events)) = wait_list_parts(wait_list) else {
            return Status::INVALID_EVENT_WAIT_LIST;
        };
        // SAFETY: forwarded caller contract on `src`.
        Status(unsafe {
            (self.enqueue_write_buffer)(
                queue,
                buffer,
                u32::from(blocking),
                offset,
                size,
                src.cast(),
                num_events,
                events,
                event,
            )
        })
    }

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
    ) -> Status {
        let Some((num_events, events)) = wait_list_parts(wait_list) else {
            return Status::INVALID_EVENT_WAIT_LIST;
        };
        // SAFETY: device-side copy, no host memory involved.
        Status(unsafe {
            (self.enqueue_copy_buffer)(
                queue, src, dst, src_offset, dst_offset, size, num_events, events, event,
            )
        })
    }

    fn enqueue_marker(
        &self,
        queue: RawHandle,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status {
        let Some((num_events, events)) = wait_list_parts(wait_list) else {
            return Status::INVALID_EVENT_WAIT_LIST;
        };
        // SAFETY: `events` holds `num_events` handles or is null.
        Status(unsafe { (self.enqueue_marker_with_wait_list)(queue, num_events, events, event) })
    }

    fn finish(&self, queue: RawHandle) -> Status {
        // SAFETY: plain handle argument.
        Status(unsafe { (self.finish)(queue) })
    }

    fn flush(&self, queue: RawHandle) -> Status {
        // SAFETY: plain handle argument.
        Status(unsafe { (self.flush)(queue) })
    }

    fn wait_for_events(&self, events: &[RawHandle]) -> Status {
        let Ok(num) = u32::try_from(events.len()) else {
            return Status::INVALID_VALUE;
        };
        // SAFETY: `events` holds `num` handles.
        Status(unsafe { (self.wait_for_events)(num, events.as_ptr()) })
    }

    fn create_user_event(&self, context: RawHandle) -> std::result::Result<RawHandle, Status> {
        let mut status = 0;
        // SAFETY: plain handle argument.
        let handle = unsafe { (self.create_user_event)(context, &mut status) };
        created(handle, status)
    }

    fn set_user_event_status(&self, event: RawHandle, execution_status: i32) -> Status {
        // SAFETY: plain values only.
        Status(unsafe { (self.set_user_event_status)(event, execution_status) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_list_parts_empty_is_null() {
        let (len, ptr) = wait_list_parts(&[]).unwrap();
        assert_eq!(len, 0);
        assert!(ptr.is_null());

        let list = [RawHandle::from_addr(0x10)];
        let (len, ptr) = wait_list_parts(&list).unwrap();
        assert_eq!(len, 1);
        assert_eq!(ptr, list.as_ptr());
    }

    #[test]
    fn test_created_maps_null_success() {
        assert_eq!(created(RawHandle::NULL, 0), Err(Status::OUT_OF_RESOURCES));
        assert_eq!(created(RawHandle::NULL, -34), Err(Status::INVALID_CONTEXT));
        assert!(created(RawHandle::from_addr(0x40), 0).is_ok());
    }

    #[test]
    fn test_load_reports_unavailable_or_succeeds() {
        // Machines without an ICD loader must get a typed error, never a panic.
        match OpenClApi::load() {
            Ok(api) => assert!(format!("{api:?}").starts_with("OpenClApi")),
            Err(e) => assert!(matches!(e, Error::Unavailable(_))),
        }
    }
}
