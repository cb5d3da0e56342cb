// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Deterministic in-process runtime.
//!
//! [`MockApi`] implements [`NativeApi`] without any driver. It exposes one
//! platform with a GPU and a CPU device, compiles OpenCL C well enough to
//! discover kernels and diagnose broken sources, and executes commands
//! against host memory when the host synchronizes.
//!
//! Kernels have no device code to run, so their behaviour is registered from
//! Rust with [`MockApi::register_kernel`]. A launch of a kernel with no
//! registered behaviour completes without touching any buffer. The built-in
//! `copy` behaviour copies argument 0 into argument 1.
//!
//! ## Example
//!
//! ```rust
//! use rust_cl_core::mock::MockApi;
//! use rust_cl_core::{get_platforms, Runtime};
//!
//! let mock = MockApi::new();
//! let runtime = Runtime::new(mock.clone());
//! let platforms = get_platforms(&runtime)?;
//! assert_eq!(platforms.len(), 1);
//! assert!(mock.calls() > 0);
//! # Ok::<(), rust_cl_core::Error>(())
//! ```

mod compiler;
mod scheduler;
mod state;

use std::ffi::CStr;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

pub use scheduler::{KernelFn, KernelInvocation};

use crate::api::{InfoTarget, NativeApi};
use crate::classify::{self, ops};
use crate::sys::{ObjectKind, RawHandle, Status};
use state::State;

/// In-process [`NativeApi`] implementation.
///
/// Clones share the same runtime state, so a test can keep one clone to
/// inspect call counts and live objects while a [`crate::Runtime`] owns
/// another.
#[derive(Clone)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    /// A runtime with one platform exposing a GPU and a CPU device.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(State::new(true, true))
    }

    /// A runtime with no platforms at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_state(State::new(false, true))
    }

    /// A runtime whose devices report no compiler.
    #[must_use]
    pub fn without_compiler() -> Self {
        Self::with_state(State::new(true, false))
    }

    fn with_state(state: State) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Number of native entry points called so far.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.state.lock().calls
    }

    /// Make the next call of `entry_point` (e.g. `"clCreateBuffer"`) fail
    /// with `status` without doing anything.
    ///
    /// Each injection fires once; several can be queued for the same entry.
    pub fn inject_failure(&self, entry_point: &str, status: Status) {
        self.state
            .lock()
            .failures
            .push((entry_point.to_string(), status));
    }

    /// Register the behaviour run when a kernel called `name` executes.
    ///
    /// Replaces an earlier registration of the same name, including the
    /// built-in `copy`.
    pub fn register_kernel<F>(&self, name: &str, behaviour: F)
    where
        F: Fn(&mut KernelInvocation<'_>) + Send + Sync + 'static,
    {
        let behaviour: KernelFn = Arc::new(behaviour);
        self.state.lock().kernels.insert(name.to_string(), behaviour);
    }

    /// Number of objects still alive, including ones only the runtime holds.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.state.lock().live_objects()
    }

    /// Whether any enqueued command has not reached a terminal state.
    #[must_use]
    pub fn pending_commands(&self) -> bool {
        self.state.lock().has_pending(None)
    }

    /// Count the call and consume a matching injected failure.
    fn enter(state: &mut State, entry: &str) -> Option<Status> {
        state.calls += 1;
        let injected = state.take_failure(entry);
        if let Some(status) = injected {
            tracing::debug!(entry, %status, "mock returning injected failure");
        }
        injected
    }

    fn call(&self, entry: &str, f: impl FnOnce(&mut State) -> Status) -> Status {
        let mut state = self.state.lock();
        match Self::enter(&mut state, entry) {
            Some(status) => status,
            None => f(&mut state),
        }
    }

    fn create(
        &self,
        entry: &str,
        f: impl FnOnce(&mut State) -> Result<usize, Status>,
    ) -> Result<RawHandle, Status> {
        let mut state = self.state.lock();
        match Self::enter(&mut state, entry) {
            Some(status) => Err(status),
            None => f(&mut state).map(RawHandle::from_addr),
        }
    }

    fn enqueue(
        &self,
        entry: &str,
        event: &mut RawHandle,
        f: impl FnOnce(&mut State) -> Result<usize, Status>,
    ) -> Status {
        match self.create(entry, f) {
            Ok(handle) => {
                *event = handle;
                Status::SUCCESS
            }
            Err(status) => status,
        }
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("MockApi");
        // Debug may run while a kernel behaviour holds the lock
        match self.state.try_lock() {
            Some(state) => debug
                .field("calls", &state.calls)
                .field("live_objects", &state.live_objects())
                .finish(),
            None => debug.finish_non_exhaustive(),
        }
    }
}

fn retain_name(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Platform => "clRetainPlatform",
        kind => classify::retain_operation(kind).name(),
    }
}

impl NativeApi for MockApi {
    fn get_platform_ids(
        &self,
        entries: Option<&mut [RawHandle]>,
        num_platforms: Option<&mut u32>,
    ) -> Status {
        self.call(ops::GET_PLATFORM_IDS.name(), |s| {
            s.get_platform_ids(entries, num_platforms)
        })
    }

    fn get_device_ids(
        &self,
        platform: RawHandle,
        device_type: u64,
        entries: Option<&mut [RawHandle]>,
        num_devices: Option<&mut u32>,
    ) -> Status {
        self.call(ops::GET_DEVICE_IDS.name(), |s| {
            s.get_device_ids(platform.addr(), device_type, entries, num_devices)
        })
    }

    fn get_info(
        &self,
        target: InfoTarget,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        self.call(classify::info_operation(&target).name(), |s| {
            s.get_info(target, param, value, size_ret)
        })
    }

    fn create_context(
        &self,
        properties: &[isize],
        devices: &[RawHandle],
    ) -> Result<RawHandle, Status> {
        self.create(ops::CREATE_CONTEXT.name(), |s| {
            s.create_context(properties, devices)
        })
    }

    fn retain(&self, kind: ObjectKind, handle: RawHandle) -> Status {
        self.call(retain_name(kind), |s| s.retain(kind, handle.addr()))
    }

    fn release(&self, kind: ObjectKind, handle: RawHandle) -> Status {
        self.call(classify::release_name(kind), |s| s.release(kind, handle.addr()))
    }

    fn create_command_queue(
        &self,
        context: RawHandle,
        device: RawHandle,
        properties: &[u64],
    ) -> Result<RawHandle, Status> {
        self.create(ops::CREATE_COMMAND_QUEUE.name(), |s| {
            s.create_command_queue(context.addr(), device.addr(), properties)
        })
    }

    fn create_program_with_source(
        &self,
        context: RawHandle,
        sources: &[&[u8]],
    ) -> Result<RawHandle, Status> {
        self.create(ops::CREATE_PROGRAM_WITH_SOURCE.name(), |s| {
            s.create_program_with_source(context.addr(), sources)
        })
    }

    fn create_program_with_il(&self, context: RawHandle, il: &[u8]) -> Result<RawHandle, Status> {
        self.create(ops::CREATE_PROGRAM_WITH_IL.name(), |s| {
            s.create_program_with_il(context.addr(), il)
        })
    }

    fn build_program(&self, program: RawHandle, devices: &[RawHandle], options: &CStr) -> Status {
        self.call(ops::BUILD_PROGRAM.name(), |s| {
            s.build_program(program.addr(), devices, options)
        })
    }

    fn create_kernel(&self, program: RawHandle, name: &CStr) -> Result<RawHandle, Status> {
        self.create(ops::CREATE_KERNEL.name(), |s| {
            s.create_kernel(program.addr(), name)
        })
    }

    fn set_kernel_arg(
        &self,
        kernel: RawHandle,
        index: u32,
        size: usize,
        value: Option<&[u8]>,
    ) -> Status {
        self.call(ops::SET_KERNEL_ARG.name(), |s| {
            s.set_kernel_arg(kernel.addr(), index, size, value)
        })
    }

    fn create_buffer(
        &self,
        context: RawHandle,
        flags: u64,
        size: usize,
        host: Option<&[u8]>,
    ) -> Result<RawHandle, Status> {
        self.create(ops::CREATE_BUFFER.name(), |s| {
            s.create_buffer(context.addr(), flags, size, host)
        })
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
        self.enqueue(ops::ENQUEUE_ND_RANGE_KERNEL.name(), event, |s| {
            s.enqueue_nd_range_kernel(
                queue.addr(),
                kernel.addr(),
                global_offset,
                global_size,
                local_size,
                wait_list,
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
        self.call(ops::ENQUEUE_READ_BUFFER.name(), |s| {
            s.enqueue_read_buffer(
                queue.addr(),
                buffer.addr(),
                blocking,
                offset,
                size,
                dst,
                wait_list,
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
        self.call(ops::ENQUEUE_WRITE_BUFFER.name(), |s| {
            s.enqueue_write_buffer(
                queue.addr(),
                buffer.addr(),
                blocking,
                offset,
                size,
                src,
                wait_list,
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
        self.enqueue(ops::ENQUEUE_COPY_BUFFER.name(), event, |s| {
            s.enqueue_copy_buffer(
                queue.addr(),
                src.addr(),
                dst.addr(),
                src_offset,
                dst_offset,
                size,
                wait_list,
            )
        })
    }

    fn enqueue_marker(
        &self,
        queue: RawHandle,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status {
        self.enqueue(ops::ENQUEUE_MARKER.name(), event, |s| {
            s.enqueue_marker(queue.addr(), wait_list)
        })
    }

    fn finish(&self, queue: RawHandle) -> Status {
        self.call(ops::FINISH.name(), |s| s.finish(queue.addr()))
    }

    fn flush(&self, queue: RawHandle) -> Status {
        self.call(ops::FLUSH.name(), |s| s.flush(queue.addr()))
    }

    fn wait_for_events(&self, events: &[RawHandle]) -> Status {
        self.call(ops::WAIT_FOR_EVENTS.name(), |s| s.wait_for_events(events))
    }

    fn create_user_event(&self, context: RawHandle) -> Result<RawHandle, Status> {
        self.create(ops::CREATE_USER_EVENT.name(), |s| {
            s.create_user_event(context.addr())
        })
    }

    fn set_user_event_status(&self, event: RawHandle, execution_status: i32) -> Status {
        self.call(ops::SET_USER_EVENT_STATUS.name(), |s| {
            s.set_user_event_status(event.addr(), execution_status)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::{context_info, event_info, execution_status, profiling_info, CONTEXT_PLATFORM};

    const GPU: RawHandle = RawHandle(0x200 as *mut std::ffi::c_void);

    fn context(api: &MockApi) -> RawHandle {
        api.create_context(&[CONTEXT_PLATFORM, 0x100, 0], &[GPU])
            .unwrap()
    }

    fn query_u32(api: &MockApi, target: InfoTarget, param: u32) -> u32 {
        let mut bytes = [0u8; 4];
        assert_eq!(
            api.get_info(target, param, Some(&mut bytes), None),
            Status::SUCCESS
        );
        u32::from_ne_bytes(bytes)
    }

    fn query_i32(api: &MockApi, target: InfoTarget, param: u32) -> i32 {
        let mut bytes = [0u8; 4];
        assert_eq!(
            api.get_info(target, param, Some(&mut bytes), None),
            Status::SUCCESS
        );
        i32::from_ne_bytes(bytes)
    }

    #[test]
    fn test_two_call_enumeration() {
        let api = MockApi::new();
        let mut num = 0;
        assert_eq!(api.get_platform_ids(None, Some(&mut num)), Status::SUCCESS);
        assert_eq!(num, 1);
        let mut ids = vec![RawHandle::NULL; num as usize];
        assert_eq!(api.get_platform_ids(Some(&mut ids), None), Status::SUCCESS);
        assert_eq!(ids[0].addr(), 0x100);

        let mut num = 0;
        assert_eq!(
            api.get_device_ids(ids[0], 1 << 2, None, Some(&mut num)),
            Status::SUCCESS
        );
        assert_eq!(num, 1);
        assert_eq!(
            api.get_device_ids(ids[0], 1 << 3, None, Some(&mut num)),
            Status::DEVICE_NOT_FOUND
        );
        assert_eq!(num, 0);
        assert_eq!(api.calls(), 4);
    }

    #[test]
    fn test_empty_runtime_reports_no_platforms() {
        let api = MockApi::empty();
        let mut num = 7;
        assert_eq!(
            api.get_platform_ids(None, Some(&mut num)),
            Status::PLATFORM_NOT_FOUND_KHR
        );
        assert_eq!(num, 0);
    }

    #[test]
    fn test_refcount_reports_external_references() {
        let api = MockApi::new();
        let ctx = context(&api);
        let target = InfoTarget::Context(ctx);
        assert_eq!(query_u32(&api, target, context_info::REFERENCE_COUNT), 1);

        assert_eq!(api.retain(ObjectKind::Context, ctx), Status::SUCCESS);
        assert_eq!(query_u32(&api, target, context_info::REFERENCE_COUNT), 2);

        let queue = api.create_command_queue(ctx, GPU, &[0]).unwrap();
        assert_eq!(query_u32(&api, target, context_info::REFERENCE_COUNT), 2);

        assert_eq!(api.release(ObjectKind::Context, ctx), Status::SUCCESS);
        assert_eq!(api.release(ObjectKind::Context, ctx), Status::SUCCESS);
        assert_eq!(
            api.get_info(target, context_info::REFERENCE_COUNT, None, Some(&mut 0)),
            Status::INVALID_CONTEXT
        );
        assert_eq!(api.live_objects(), 2);
        assert_eq!(api.release(ObjectKind::CommandQueue, queue), Status::SUCCESS);
        assert_eq!(api.live_objects(), 0);
    }

    #[test]
    fn test_commands_run_at_synchronization() {
        let api = MockApi::new();
        let ctx = context(&api);
        let queue = api.create_command_queue(ctx, GPU, &[0]).unwrap();
        let buffer = api.create_buffer(ctx, 1, 4, None).unwrap();

        let data = 42u32.to_ne_bytes();
        let mut write = RawHandle::NULL;
        // SAFETY: `data` outlives the finish below.
        let status = unsafe {
            api.enqueue_write_buffer(queue, buffer, false, 0, 4, data.as_ptr(), &[], &mut write)
        };
        assert_eq!(status, Status::SUCCESS);
        assert!(api.pending_commands());
        assert_eq!(
            query_i32(&api, InfoTarget::Event(write), event_info::COMMAND_EXECUTION_STATUS),
            execution_status::QUEUED
        );

        let mut out = [0u8; 4];
        let mut read = RawHandle::NULL;
        // SAFETY: blocking read into a live local.
        let status = unsafe {
            api.enqueue_read_buffer(queue, buffer, true, 0, 4, out.as_mut_ptr(), &[], &mut read)
        };
        assert_eq!(status, Status::SUCCESS);
        assert_eq!(u32::from_ne_bytes(out), 42);
        assert!(!api.pending_commands());

        for handle in [write, read] {
            assert_eq!(api.release(ObjectKind::Event, handle), Status::SUCCESS);
        }
        assert_eq!(api.release(ObjectKind::Mem, buffer), Status::SUCCESS);
        assert_eq!(api.release(ObjectKind::CommandQueue, queue), Status::SUCCESS);
        assert_eq!(api.release(ObjectKind::Context, ctx), Status::SUCCESS);
        assert_eq!(api.live_objects(), 0);
    }

    #[test]
    fn test_queue_release_flushes_pending_commands() {
        let api = MockApi::new();
        let ctx = context(&api);
        let queue = api.create_command_queue(ctx, GPU, &[0]).unwrap();
        let mut marker = RawHandle::NULL;
        assert_eq!(api.enqueue_marker(queue, &[], &mut marker), Status::SUCCESS);
        assert!(api.pending_commands());

        assert_eq!(api.release(ObjectKind::Event, marker), Status::SUCCESS);
        assert_eq!(api.release(ObjectKind::CommandQueue, queue), Status::SUCCESS);
        assert!(!api.pending_commands());
        assert_eq!(api.release(ObjectKind::Context, ctx), Status::SUCCESS);
        assert_eq!(api.live_objects(), 0);
    }

    #[test]
    fn test_profiling_requires_flag_and_completion() {
        let api = MockApi::new();
        let ctx = context(&api);
        let plain = api.create_command_queue(ctx, GPU, &[0]).unwrap();
        let profiled = api
            .create_command_queue(ctx, GPU, &[crate::sys::QUEUE_PROPERTIES, 2, 0])
            .unwrap();

        let mut a = RawHandle::NULL;
        let mut b = RawHandle::NULL;
        assert_eq!(api.enqueue_marker(plain, &[], &mut a), Status::SUCCESS);
        assert_eq!(api.enqueue_marker(profiled, &[], &mut b), Status::SUCCESS);
        let mut value = [0u8; 8];
        assert_eq!(
            api.get_info(InfoTarget::EventProfiling(b), profiling_info::END, Some(&mut value), None),
            Status::PROFILING_INFO_NOT_AVAILABLE
        );

        assert_eq!(api.wait_for_events(&[a, b]), Status::SUCCESS);
        assert_eq!(
            api.get_info(InfoTarget::EventProfiling(a), profiling_info::END, Some(&mut value), None),
            Status::PROFILING_INFO_NOT_AVAILABLE
        );
        let mut queued = [0u8; 8];
        assert_eq!(
            api.get_info(InfoTarget::EventProfiling(b), profiling_info::QUEUED, Some(&mut queued), None),
            Status::SUCCESS
        );
        assert_eq!(
            api.get_info(InfoTarget::EventProfiling(b), profiling_info::END, Some(&mut value), None),
            Status::SUCCESS
        );
        assert!(u64::from_ne_bytes(value) > u64::from_ne_bytes(queued));
    }

    #[test]
    fn test_user_event_gates_queue() {
        let api = MockApi::new();
        let ctx = context(&api);
        let queue = api.create_command_queue(ctx, GPU, &[0]).unwrap();
        let gate = api.create_user_event(ctx).unwrap();

        let mut marker = RawHandle::NULL;
        assert_eq!(api.enqueue_marker(queue, &[gate], &mut marker), Status::SUCCESS);
        assert_eq!(api.flush(queue), Status::SUCCESS);
        assert_eq!(
            query_i32(&api, InfoTarget::Event(marker), event_info::COMMAND_EXECUTION_STATUS),
            execution_status::QUEUED
        );

        assert_eq!(
            api.set_user_event_status(gate, execution_status::COMPLETE),
            Status::SUCCESS
        );
        assert_eq!(
            query_i32(&api, InfoTarget::Event(marker), event_info::COMMAND_EXECUTION_STATUS),
            execution_status::COMPLETE
        );
        assert_eq!(
            api.set_user_event_status(gate, execution_status::COMPLETE),
            Status::INVALID_OPERATION
        );
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let api = MockApi::new();
        let ctx = context(&api);
        api.inject_failure("clCreateBuffer", Status::OUT_OF_RESOURCES);
        assert_eq!(
            api.create_buffer(ctx, 1, 16, None),
            Err(Status::OUT_OF_RESOURCES)
        );
        assert!(api.create_buffer(ctx, 1, 16, None).is_ok());
    }

    #[test]
    fn test_registered_kernel_runs() {
        let api = MockApi::new();
        api.register_kernel("fill", |inv| {
            let value: u32 = inv.scalar(1).unwrap_or_default();
            let n = inv.work_items();
            inv.write(0, &vec![value; n]);
        });
        let ctx = context(&api);
        let queue = api.create_command_queue(ctx, GPU, &[0]).unwrap();
        let program = api
            .create_program_with_source(
                ctx,
                &[b"__kernel void fill(__global uint* out, uint value) { out[get_global_id(0)] = value; }"],
            )
            .unwrap();
        assert_eq!(api.build_program(program, &[], c""), Status::SUCCESS);
        let kernel = api.create_kernel(program, c"fill").unwrap();
        let buffer = api.create_buffer(ctx, 1, 16, None).unwrap();
        assert_eq!(
            api.set_kernel_arg(kernel, 0, std::mem::size_of::<usize>(), Some(&buffer.to_ne_bytes())),
            Status::SUCCESS
        );
        assert_eq!(
            api.set_kernel_arg(kernel, 1, 4, Some(&9u32.to_ne_bytes())),
            Status::SUCCESS
        );

        let mut event = RawHandle::NULL;
        assert_eq!(
            api.enqueue_nd_range_kernel(queue, kernel, None, &[4], None, &[], &mut event),
            Status::SUCCESS
        );
        assert_eq!(api.finish(queue), Status::SUCCESS);

        let mut out = [0u8; 16];
        let mut read = RawHandle::NULL;
        // SAFETY: blocking read into a live local.
        let status = unsafe {
            api.enqueue_read_buffer(queue, buffer, true, 0, 16, out.as_mut_ptr(), &[], &mut read)
        };
        assert_eq!(status, Status::SUCCESS);
        let words: Vec<u32> = out
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(words, vec![9; 4]);
    }

    #[test]
    fn test_kernel_arg_validation() {
        let api = MockApi::new();
        let ctx = context(&api);
        let program = api
            .create_program_with_source(
                ctx,
                &[b"kernel void k(global float* a, local float* scratch, int n) {}"],
            )
            .unwrap();
        assert_eq!(api.build_program(program, &[], c"-cl-fast-relaxed-math"), Status::SUCCESS);
        assert_eq!(
            api.build_program(program, &[], c"fast"),
            Status::INVALID_BUILD_OPTIONS
        );
        let kernel = api.create_kernel(program, c"k").unwrap();
        assert_eq!(
            api.build_program(program, &[], c""),
            Status::INVALID_OPERATION
        );

        assert_eq!(api.set_kernel_arg(kernel, 3, 4, Some(&[0; 4])), Status::INVALID_ARG_INDEX);
        assert_eq!(api.set_kernel_arg(kernel, 2, 8, Some(&[0; 8])), Status::INVALID_ARG_SIZE);
        assert_eq!(api.set_kernel_arg(kernel, 1, 64, None), Status::SUCCESS);
        assert_eq!(api.set_kernel_arg(kernel, 1, 0, None), Status::INVALID_ARG_SIZE);
        assert_eq!(
            api.set_kernel_arg(kernel, 0, std::mem::size_of::<usize>(), Some(&0xdeadusize.to_ne_bytes())),
            Status::INVALID_MEM_OBJECT
        );
        assert_eq!(api.create_kernel(program, c"missing"), Err(Status::INVALID_KERNEL_NAME));
    }

    #[test]
    fn test_il_program_builds() {
        let api = MockApi::new();
        let ctx = context(&api);
        assert_eq!(
            api.create_program_with_il(ctx, b"not spir-v"),
            Err(Status::INVALID_VALUE)
        );
        let module = compiler::tests::tiny_module("scale");
        let program = api.create_program_with_il(ctx, &module).unwrap();
        assert_eq!(api.build_program(program, &[], c""), Status::SUCCESS);
        assert!(api.create_kernel(program, c"scale").is_ok());
    }
}
