// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Benchmarks for rust-cl-core host-side overhead against the mock runtime.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_cl_core::mock::MockApi;
use rust_cl_core::{
    get_platforms, Buffer, DeviceSelector, DeviceType, MemFlags, RefCounted, Runtime, Session,
    SessionConfig,
};
use std::hint::black_box;

/// Benchmark two-call enumeration of platforms and devices.
fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumeration");
    let runtime = Runtime::new(MockApi::new());

    group.bench_function("platforms", |b| {
        b.iter(|| {
            let platforms = get_platforms(black_box(&runtime)).unwrap();
            black_box(platforms)
        })
    });

    group.bench_function("all_devices", |b| {
        let platform = get_platforms(&runtime).unwrap().remove(0);
        b.iter(|| {
            let devices = platform.devices(black_box(DeviceType::ALL_COMPUTE)).unwrap();
            black_box(devices)
        })
    });

    // Full selection walks every platform and device name
    group.bench_function("selector", |b| {
        let selector = DeviceSelector::new().with_device("GPU");
        b.iter(|| {
            let device = selector.select_first(black_box(&runtime)).unwrap();
            black_box(device)
        })
    });

    group.finish();
}

/// Benchmark info queries of each payload shape.
fn bench_info_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("info_queries");
    let runtime = Runtime::new(MockApi::new());
    let device = DeviceSelector::new().select_first(&runtime).unwrap().unwrap();

    group.bench_function("string", |b| {
        b.iter(|| black_box(device.name().unwrap()))
    });

    group.bench_function("scalar", |b| {
        b.iter(|| black_box(device.global_mem_size().unwrap()))
    });

    group.bench_function("vector", |b| {
        b.iter(|| black_box(device.max_work_item_sizes().unwrap()))
    });

    group.bench_function("extension_list", |b| {
        b.iter(|| black_box(device.extensions().unwrap()))
    });

    group.finish();
}

/// Benchmark buffer allocation and release.
fn bench_buffers(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffers");
    let runtime = Runtime::new(MockApi::new());
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();

    for len in [64usize, 4096, 1 << 16] {
        group.bench_with_input(BenchmarkId::new("create_release", len), &len, |b, &len| {
            b.iter(|| {
                let buffer =
                    Buffer::<f32>::create(session.context(), MemFlags::READ_WRITE, black_box(len))
                        .unwrap();
                buffer.release();
            })
        });
    }

    group.finish();
}

/// Benchmark enqueue round-trips through the queue.
fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");
    let runtime = Runtime::new(MockApi::new());
    let session = Session::new(&runtime, SessionConfig::new()).unwrap();

    group.bench_function("marker_finish", |b| {
        b.iter(|| {
            let marker = session.queue().enqueue_marker(&[]).unwrap();
            session.finish().unwrap();
            marker.release();
        })
    });

    for len in [256usize, 1 << 14] {
        let data = vec![1.0f32; len];
        let buffer = session.buffer::<f32>(MemFlags::READ_WRITE, len).unwrap();
        let mut out = vec![0.0f32; len];
        group.bench_with_input(BenchmarkId::new("write_read", len), &len, |b, _| {
            b.iter(|| {
                session.write(&buffer, 0, black_box(&data)).unwrap();
                session
                    .queue()
                    .enqueue_read_buffer(&buffer, 0, &mut out, &[])
                    .unwrap()
                    .release();
                black_box(&out);
            })
        });
        buffer.release();
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_enumeration,
    bench_info_queries,
    bench_buffers,
    bench_enqueue,
);
criterion_main!(benches);
