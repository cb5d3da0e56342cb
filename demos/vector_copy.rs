// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Example: Vector Copy
//!
//! Builds a copy kernel, runs it over a 1024-element vector on a profiling
//! queue and reports the timestamps of each command.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example vector_copy
//! ```

#![allow(clippy::cast_precision_loss)] // Example code - precision loss acceptable for display

use rust_cl_core::logging::log_profiling;
use rust_cl_core::mock::MockApi;
use rust_cl_core::{
    init_logging, Event, LogConfig, MemFlags, RefCounted, Result, Runtime, Session, SessionConfig,
};

const SOURCE: &str = r"
__kernel void copy(__global const float* src, __global float* dst) {
    size_t i = get_global_id(0);
    dst[i] = src[i];
}
";

const LEN: usize = 1024;

fn main() -> Result<()> {
    init_logging(&LogConfig::development())?;
    println!("=== Vector Copy Example ===\n");

    let runtime = Runtime::new(MockApi::new());
    let session = Session::new(
        &runtime,
        SessionConfig::from_env().with_profiling(true).with_verbose(true),
    )?;
    println!("Device: {}\n", session.device().name()?);

    let kernel = session.kernel(SOURCE, "-cl-fast-relaxed-math", "copy")?.scoped();
    let input: Vec<f32> = (0..LEN).map(|i| i as f32).collect();
    let src = session.buffer::<f32>(MemFlags::READ_ONLY, LEN)?.scoped();
    let dst = session.buffer::<f32>(MemFlags::WRITE_ONLY, LEN)?.scoped();

    let queue = session.queue();
    let write = queue.enqueue_write_buffer(&src, 0, &input, &[])?.scoped();

    kernel.set_arg(0, &*src)?;
    kernel.set_arg(1, &*dst)?;
    let run = queue
        .enqueue_nd_range_kernel(&kernel, None, &[LEN], Some(&[64]), &[&*write])?
        .scoped();

    let mut output = vec![0.0f32; LEN];
    let read = queue.enqueue_read_buffer(&dst, 0, &mut output, &[&*run])?.scoped();

    let mismatches = input.iter().zip(&output).filter(|(a, b)| a != b).count();
    println!("Copied {LEN} elements, {mismatches} mismatches\n");

    report("write", &write)?;
    report("copy", &run)?;
    report("read", &read)?;
    Ok(())
}

fn report(label: &str, event: &Event) -> Result<()> {
    match event.profile()? {
        Some(times) => {
            log_profiling(label, &times);
            println!(
                "{label:>6}: {:>8.3} us on device, {:>8.3} us from enqueue",
                times.duration_ns() as f64 / 1_000.0,
                times.latency_ns() as f64 / 1_000.0
            );
        }
        None => println!("{label:>6}: no profiling data"),
    }
    Ok(())
}
