// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Integration tests for rust-cl-core.
//!
//! These tests drive the public API against the in-process mock runtime.

#![allow(clippy::cast_precision_loss)] // test data is generated from small indices

use std::panic::{catch_unwind, AssertUnwindSafe};

use proptest::prelude::*;
use rust_cl_core::classify::{ops, Outcome};
use rust_cl_core::mock::MockApi;
use rust_cl_core::query::InfoRequest;
use rust_cl_core::sys::device_info;
use rust_cl_core::{
    get_platforms, wait_for_events, Buffer, CommandQueue, CommandType, Context, DeviceSelector,
    DeviceType, Error, ErrorKind, ExecutionStatus, InfoTarget, Kernel, LocalMemory, MemFlags,
    Program, QueueProperties, RefCounted, Runtime, Session, SessionConfig, Status, UserEvent,
};

const COPY_SOURCE: &str =
    "__kernel void copy(__global const float* src, __global float* dst) { dst[get_global_id(0)] = src[get_global_id(0)]; }";

fn mock_runtime() -> (MockApi, Runtime) {
    let mock = MockApi::new();
    let runtime = Runtime::new(mock.clone());
    (mock, runtime)
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[test]
fn test_platform_and_device_discovery() {
    let (_mock, runtime) = mock_runtime();
    let platforms = get_platforms(&runtime).unwrap();
    assert_eq!(platforms.len(), 1);
    assert_eq!(platforms[0].name().unwrap(), "Mock Platform");

    let all = platforms[0].devices(DeviceType::ALL_COMPUTE).unwrap();
    assert_eq!(all.len(), 2);
    let gpus = platforms[0].devices(DeviceType::GPU).unwrap();
    assert_eq!(gpus.len(), 1);
    assert_eq!(gpus[0].device_type().unwrap(), DeviceType::GPU);
    assert_eq!(gpus[0].platform().unwrap(), platforms[0]);
}

#[test]
fn test_runtime_without_platforms_is_empty() {
    let runtime = Runtime::new(MockApi::empty());
    assert!(get_platforms(&runtime).unwrap().is_empty());
    assert!(DeviceSelector::new().select(&runtime).unwrap().is_empty());
}

#[test]
fn test_missing_device_type_yields_empty_list() {
    let (_mock, runtime) = mock_runtime();
    let platform = get_platforms(&runtime).unwrap().remove(0);
    assert!(platform.devices(DeviceType::ACCELERATOR).unwrap().is_empty());
}

#[test]
fn test_selector_filters_by_name() {
    let (_mock, runtime) = mock_runtime();
    let cpu = DeviceSelector::new()
        .with_device("CPU")
        .select_first(&runtime)
        .unwrap()
        .unwrap();
    assert_eq!(cpu.name().unwrap(), "Mock CPU Device");

    let none = DeviceSelector::new()
        .with_platform("Other Vendor")
        .select(&runtime)
        .unwrap();
    assert!(none.is_empty());
}

// ============================================================================
// Reference Counting Tests
// ============================================================================

#[test]
fn test_clone_and_release_balance() {
    let (mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let context = Context::create(&[&device], None).unwrap();
    assert_eq!(context.reference_count().unwrap(), 1);

    let shared = context.try_clone().unwrap();
    assert_eq!(context.reference_count().unwrap(), 2);
    shared.release();
    assert_eq!(context.reference_count().unwrap(), 1);

    context.release();
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_parents_outlive_their_handles() {
    let (mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let context = Context::create(&[&device], None).unwrap();
    let program = Program::create_with_source(&context, COPY_SOURCE).unwrap();
    program.build(&[&device], "").unwrap();
    let kernel = Kernel::create(&program, "copy").unwrap();

    // the kernel keeps the program and the program keeps the context
    program.release();
    context.release();
    assert_eq!(kernel.function_name().unwrap(), "copy");
    assert_eq!(kernel.num_args().unwrap(), 2);
    assert_eq!(mock.live_objects(), 3);

    kernel.release();
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_scoped_guard_releases() {
    let (mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    {
        let context = Context::create(&[&device], None).unwrap().scoped();
        let _queue = CommandQueue::create(&context, &device, QueueProperties::empty())
            .unwrap()
            .scoped();
        assert_eq!(mock.live_objects(), 2);
    }
    assert_eq!(mock.live_objects(), 0);
}

// ============================================================================
// Precondition Tests
// ============================================================================

#[test]
fn test_out_of_bounds_read_panics_before_native_call() {
    let (mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let buffer = session.buffer::<u32>(MemFlags::READ_WRITE, 4).unwrap();
    let before = mock.calls();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut dst = [0u32; 4];
        let _ = session.queue().enqueue_read_buffer(&buffer, 1, &mut dst, &[]);
    }));
    let payload = result.unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(message.contains("precondition violated"), "{message}");
    assert_eq!(mock.calls(), before);

    buffer.release();
}

#[test]
fn test_dimension_mismatch_panics_before_native_call() {
    let (mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let kernel = session.kernel(COPY_SOURCE, "", "copy").unwrap();
    let before = mock.calls();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _ = session
            .queue()
            .enqueue_nd_range_kernel(&kernel, None, &[16, 16], Some(&[4]), &[]);
    }));
    assert!(result.is_err());
    assert_eq!(mock.calls(), before);

    kernel.release();
}

#[test]
#[should_panic(expected = "precondition violated")]
fn test_empty_write_panics() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let buffer = session.buffer::<f32>(MemFlags::READ_WRITE, 8).unwrap();
    let _ = session.queue().enqueue_write_buffer(&buffer, 0, &[], &[]);
}

#[test]
#[should_panic(expected = "precondition violated")]
fn test_positive_user_event_failure_code_panics() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let gate = UserEvent::create(session.context()).unwrap();
    let _ = gate.set_failed(5);
}

// ============================================================================
// Queue and Event Tests
// ============================================================================

#[test]
fn test_profiled_round_trip() {
    let (mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new().with_profiling(true)).unwrap();
    let queue = session.queue();
    let input: Vec<f32> = (0..1024).map(|i| i as f32 * 0.5).collect();

    let src = session.buffer::<f32>(MemFlags::READ_ONLY, input.len()).unwrap();
    let dst = session.buffer::<f32>(MemFlags::WRITE_ONLY, input.len()).unwrap();

    let write = queue.enqueue_write_buffer(&src, 0, &input, &[]).unwrap();
    assert_eq!(write.command_type().unwrap(), CommandType::WriteBuffer);
    assert_eq!(write.status().unwrap(), ExecutionStatus::Complete);

    let copy = queue
        .enqueue_copy_buffer(&src, &dst, 0, 0, input.len(), &[&write])
        .unwrap();
    let mut output = vec![0.0f32; input.len()];
    let read = queue.enqueue_read_buffer(&dst, 0, &mut output, &[]).unwrap();
    assert_eq!(output, input);

    for event in [&write, &copy, &read] {
        let times = event.profile().unwrap().expect("profiling enabled");
        assert!(times.queued <= times.submitted);
        assert!(times.submitted <= times.started);
        assert!(times.started <= times.ended);
        assert!(times.ended <= times.completed);
    }

    for event in [write, copy, read] {
        event.release();
    }
    src.release();
    dst.release();
    drop(session);
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_profiling_unavailable_without_flag() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let marker = session.queue().enqueue_marker(&[]).unwrap();
    marker.wait().unwrap();
    assert!(marker.profile().unwrap().is_none());
    marker.release();
}

#[test]
fn test_wait_list_orders_across_queues() {
    let (mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let other = CommandQueue::create(
        session.context(),
        session.device(),
        QueueProperties::empty(),
    )
    .unwrap();

    let src = session.buffer::<u32>(MemFlags::READ_WRITE, 256).unwrap();
    let dst = session.buffer::<u32>(MemFlags::READ_WRITE, 256).unwrap();
    let data: Vec<u32> = (0..256).collect();

    let pending = session
        .queue()
        .enqueue_write_buffer_async(&src, 0, data.clone(), &[])
        .unwrap();
    let copy = other
        .enqueue_copy_buffer(&src, &dst, 0, 0, 256, &[pending.event()])
        .unwrap();
    copy.wait().unwrap();
    assert_eq!(pending.event().status().unwrap(), ExecutionStatus::Complete);
    assert_eq!(pending.wait().unwrap(), data);

    let read = other
        .enqueue_read_buffer_async(&dst, 0, vec![0u32; 256], &[&copy])
        .unwrap();
    assert_eq!(read.wait().unwrap(), data);

    copy.release();
    other.release();
    src.release();
    dst.release();
    drop(session);
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_user_event_failure_propagates() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let gate = UserEvent::create(session.context()).unwrap();
    assert_eq!(gate.status().unwrap(), ExecutionStatus::Submitted);

    let marker = session.queue().enqueue_marker(&[&gate]).unwrap();
    session.queue().flush().unwrap();
    assert_eq!(marker.status().unwrap(), ExecutionStatus::Queued);

    gate.set_failed(-100).unwrap();
    assert!(matches!(marker.status().unwrap(), ExecutionStatus::Error(_)));

    let err = wait_for_events(&[&marker]).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ExecStatusErrorForEvents));
    assert_eq!(err.status(), Some(Status::EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST));

    let buffer = session.buffer::<u8>(MemFlags::READ_WRITE, 4).unwrap();
    let mut dst = [0u8; 4];
    let err = session
        .queue()
        .enqueue_read_buffer(&buffer, 0, &mut dst, &[&gate])
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ExecStatusErrorForEvents));

    buffer.release();
    marker.release();
    gate.release();
}

#[test]
fn test_user_event_completion_releases_queue() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let gate = UserEvent::create(session.context()).unwrap();
    let marker = session.queue().enqueue_marker(&[&gate]).unwrap();

    gate.set_complete().unwrap();
    marker.wait().unwrap();
    assert_eq!(marker.command_type().unwrap(), CommandType::Marker);

    marker.release();
    gate.release();
}

#[test]
fn test_empty_wait_makes_no_native_call() {
    let (mock, _runtime) = mock_runtime();
    let before = mock.calls();
    wait_for_events(&[]).unwrap();
    assert_eq!(mock.calls(), before);
}

// ============================================================================
// Error Classification Tests
// ============================================================================

#[test]
fn test_build_failure_reports_log() {
    let (_mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let context = Context::create(&[&device], None).unwrap();
    let program =
        Program::create_with_source(&context, "__kernel void broken(__global int* x) { x[0] = ")
            .unwrap();

    let err = program.build(&[&device], "").unwrap_err();
    assert!(err.is_build_failure());
    assert_eq!(err.status(), Some(Status::BUILD_PROGRAM_FAILURE));
    assert!(!program.build_log(&device).unwrap().is_empty());

    program.release();
    context.release();
}

#[test]
fn test_missing_compiler_is_reported() {
    let runtime = Runtime::new(MockApi::without_compiler());
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let err = session.build_program(COPY_SOURCE, "").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::CompilerNotAvailable));
}

#[test]
fn test_unknown_kernel_name() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let err = session.kernel(COPY_SOURCE, "", "scale").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidKernelName));
}

#[test]
fn test_zero_size_buffer_is_allocation_failure() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let err = session.buffer::<f32>(MemFlags::READ_WRITE, 0).unwrap_err();
    assert!(err.is_allocation_failure());
    assert_eq!(err.kind(), Some(ErrorKind::OutOfDeviceMemory));
}

#[test]
fn test_injected_resource_failure() {
    let (mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    mock.inject_failure("clCreateBuffer", Status::MEM_OBJECT_ALLOCATION_FAILURE);

    let err = Buffer::<u8>::create(session.context(), MemFlags::READ_WRITE, 64).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::OutOfDeviceMemory));
    assert!(err.to_string().contains("clCreateBuffer"));

    let buffer = Buffer::<u8>::create(session.context(), MemFlags::READ_WRITE, 64).unwrap();
    buffer.release();
}

#[test]
fn test_session_without_platforms_is_unavailable() {
    let runtime = Runtime::new(MockApi::empty());
    let err = Session::new(&runtime, SessionConfig::new()).unwrap_err();
    assert!(matches!(err, Error::Unavailable(_)));
    assert_eq!(err.kind(), None);
}

#[test]
fn test_missing_queue_constructor_is_invalid_operation() {
    let (mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let context = Context::create(&[&device], None).unwrap();
    mock.inject_failure("clCreateCommandQueueWithProperties", Status::INVALID_OPERATION);

    let err = CommandQueue::create(&context, &device, QueueProperties::empty()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidOperation));
    assert_eq!(err.status(), Some(Status::INVALID_OPERATION));

    context.release();
    assert_eq!(mock.live_objects(), 0);
}

// ============================================================================
// Info Query Tests
// ============================================================================

#[test]
#[should_panic(expected = "precondition violated")]
fn test_short_fill_destination_panics() {
    let (_mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let sized = InfoRequest::new(&runtime, InfoTarget::Device(device.as_raw()), device_info::NAME)
        .size()
        .unwrap();
    let mut dst = vec![0u8; sized.size() / 2];
    let _ = sized.fill(&mut dst);
}

#[test]
fn test_short_fill_destination_skips_native_call() {
    let (mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let sized = InfoRequest::new(&runtime, InfoTarget::Device(device.as_raw()), device_info::NAME)
        .size()
        .unwrap();
    let before = mock.calls();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut dst = [0u8; 1];
        let _ = sized.fill(&mut dst);
    }));
    assert!(result.is_err());
    assert_eq!(mock.calls(), before);
}

#[test]
fn test_extensions_with_version_records() {
    let (_mock, runtime) = mock_runtime();
    let gpu = DeviceSelector::new()
        .with_device_type(DeviceType::GPU)
        .select_first(&runtime)
        .unwrap()
        .unwrap();

    let records = gpu.extensions_with_version().unwrap();
    let names: Vec<&str> = records.iter().map(|nv| nv.name.as_str()).collect();
    assert_eq!(
        names,
        ["cl_khr_byte_addressable_store", "cl_khr_fp16", "cl_khr_il_program"]
    );
    assert!(records.iter().all(|nv| nv.version_triple() == (1, 0, 0)));
    assert_eq!(gpu.extensions().unwrap(), names);
}

#[test]
fn test_context_pinned_to_platform() {
    let (mock, runtime) = mock_runtime();
    let platform = get_platforms(&runtime).unwrap().remove(0);
    let device = platform.devices(DeviceType::CPU).unwrap().remove(0);

    let context = Context::create(&[&device], Some(&platform)).unwrap();
    assert_eq!(context.devices().unwrap(), vec![device]);
    assert_eq!(context.num_devices().unwrap(), 1);

    context.release();
    assert_eq!(mock.live_objects(), 0);
}

// ============================================================================
// Program and Kernel Tests
// ============================================================================

#[test]
fn test_program_from_several_fragments() {
    let (mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let fragments: [&[u8]; 2] = [
        b"__kernel void a(__global int* x) { x[0] = 1; } /* \0 */\n",
        b"__kernel void b(__global int* y) { y[0] = 2; }\n",
    ];

    let program = Program::create_with_sources(session.context(), &fragments).unwrap();
    program.build(&[session.device()], "").unwrap();
    assert_eq!(program.kernel_names().unwrap(), vec!["a", "b"]);
    assert_eq!(program.num_kernels().unwrap(), 2);
    assert!(program.source().unwrap().starts_with("__kernel void a"));

    program.release();
    drop(session);
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_invalid_il_is_reported() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let err = Program::create_with_il(session.context(), b"not an IL module").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidIl));
}

#[test]
#[should_panic(expected = "precondition violated")]
fn test_empty_il_panics() {
    let (_mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let _ = Program::create_with_il(session.context(), &[]);
}

#[test]
fn test_local_memory_argument() {
    let (mock, runtime) = mock_runtime();
    mock.register_kernel("scratch", |inv| {
        let bytes = inv.local_bytes(1).unwrap_or_default();
        inv.write(0, &[u32::try_from(bytes).unwrap_or(u32::MAX)]);
    });
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();
    let kernel = session
        .kernel(
            "__kernel void scratch(__global uint* out, __local float* tmp) { tmp[0] = 0; }",
            "",
            "scratch",
        )
        .unwrap();
    let out = session.buffer::<u32>(MemFlags::WRITE_ONLY, 1).unwrap();

    kernel.set_arg(0, &out).unwrap();
    kernel.set_arg(1, &LocalMemory::for_elements::<f32>(16)).unwrap();
    session
        .queue()
        .enqueue_nd_range_kernel(&kernel, None, &[1], None, &[])
        .unwrap()
        .release();
    assert_eq!(session.read_all(&out).unwrap(), vec![64]);

    kernel.release();
    out.release();
}

#[test]
fn test_copy_kernel_round_trip_with_profiling() {
    let (mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let context = Context::create(&[&device], None).unwrap();
    let queue = CommandQueue::create(&context, &device, QueueProperties::PROFILING_ENABLE).unwrap();
    let input: Vec<f32> = (0..1024).map(|i| i as f32).collect();

    let src = Buffer::create_with_data(&context, MemFlags::READ_ONLY, &input).unwrap();
    let dst = Buffer::<f32>::create(&context, MemFlags::WRITE_ONLY, input.len()).unwrap();
    let program = Program::create_with_source(&context, COPY_SOURCE).unwrap();
    program.build(&[&device], "").unwrap();
    let kernel = Kernel::create(&program, "copy").unwrap();
    kernel.set_arg(0, &src).unwrap();
    kernel.set_arg(1, &dst).unwrap();

    let run = queue
        .enqueue_nd_range_kernel(&kernel, None, &[1024], None, &[])
        .unwrap();
    let mut output = vec![0.0f32; input.len()];
    let read = queue.enqueue_read_buffer(&dst, 0, &mut output, &[&run]).unwrap();
    assert_eq!(output, input);

    let times = run.profile().unwrap().expect("profiling enabled");
    assert!(times.queued <= times.submitted);
    assert!(times.submitted <= times.started);
    assert!(times.started <= times.ended);
    assert!(times.ended <= times.completed);
    assert_eq!(run.command_type().unwrap(), CommandType::NdRangeKernel);

    read.release();
    run.release();
    kernel.release();
    program.release();
    src.release();
    dst.release();
    queue.release();
    context.release();
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_releasing_queue_with_pending_work() {
    let (mock, runtime) = mock_runtime();
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();
    let context = Context::create(&[&device], None).unwrap();
    let queue = CommandQueue::create(&context, &device, QueueProperties::empty()).unwrap();
    let buffer = Buffer::<u8>::create(&context, MemFlags::READ_WRITE, 16).unwrap();
    let marker = queue.enqueue_marker(&[]).unwrap();
    assert!(mock.pending_commands());

    queue.try_clone().unwrap().release();
    context.try_clone().unwrap().release();
    buffer.try_clone().unwrap().release();
    marker.try_clone().unwrap().release();
    assert_eq!(queue.reference_count().unwrap(), 1);

    marker.release();
    buffer.release();
    queue.release();
    context.release();
    assert!(!mock.pending_commands());
    assert_eq!(mock.live_objects(), 0);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_session_shared_across_threads() {
    let (mock, runtime) = mock_runtime();
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4u32 {
            let session = &session;
            scope.spawn(move || {
                let data: Vec<u32> = (0..64).map(|i| i * worker).collect();
                let buffer = session.buffer_from(MemFlags::READ_WRITE, &data).unwrap();
                assert_eq!(session.read_all(&buffer).unwrap(), data);
                buffer.release();
            });
        }
    });

    drop(session);
    assert_eq!(mock.live_objects(), 0);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_mem_flags_round_trip(bits in any::<u64>()) {
        prop_assert_eq!(MemFlags::from_bits_retain(bits).bits(), bits);
        prop_assert_eq!(QueueProperties::from_bits_retain(bits).bits(), bits);
        prop_assert_eq!(DeviceType::from_bits_retain(bits).bits(), bits);
    }

    #[test]
    fn prop_listed_statuses_are_named_failures(index in 0usize..64) {
        let tables = [
            ops::GET_PLATFORM_IDS,
            ops::GET_DEVICE_IDS,
            ops::CREATE_BUFFER,
            ops::BUILD_PROGRAM,
            ops::ENQUEUE_READ_BUFFER,
            ops::WAIT_FOR_EVENTS,
        ];
        for operation in tables {
            let table = operation.table();
            let (status, outcome) = table[index % table.len()];
            prop_assert!(!status.is_success());
            prop_assert!(status.name().is_some());
            prop_assert_eq!(operation.outcome(status), Some(outcome));
            if let Outcome::Fail(kind) = outcome {
                let err = operation.check_present(status).unwrap_err();
                prop_assert_eq!(err.kind(), Some(kind));
                prop_assert_eq!(err.status(), Some(status));
            }
        }
    }

    #[test]
    fn prop_unlisted_status_has_no_outcome(raw in 1i32..1000) {
        prop_assert_eq!(ops::CREATE_BUFFER.outcome(Status(raw)), None);
    }
}
