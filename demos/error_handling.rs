// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Example: Error Handling
//!
//! This example shows how callers branch on [`ErrorKind`] instead of raw
//! status numbers, and how an application wraps [`Error`] in its own type.
//!
//! Run with:
//! ```bash
//! cargo run --example error_handling
//! ```

use rust_cl_core::mock::MockApi;
use rust_cl_core::{
    DeviceSelector, DeviceType, Error, ErrorKind, MemFlags, RefCounted, Runtime, Session,
    SessionConfig, Status,
};

/// Application error wrapping the binding layer's error.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("kernel `{name}` failed to build:\n{log}")]
    Build { name: String, log: String },

    #[error(transparent)]
    Compute(#[from] Error),
}

const BROKEN: &str = "__kernel void scale(__global float* x, float s) { x[get_global_id(0)] *= s;";

fn build_kernel(session: &Session, source: &str, name: &str) -> Result<(), AppError> {
    let program = rust_cl_core::Program::create_with_source(session.context(), source)?.scoped();
    match program.build(&[session.device()], "") {
        Ok(()) => {
            let kernel = rust_cl_core::Kernel::create(&program, name)?;
            kernel.release();
            Ok(())
        }
        Err(err) if err.is_build_failure() => Err(AppError::Build {
            name: name.to_string(),
            log: program.build_log(session.device())?,
        }),
        Err(err) => Err(err.into()),
    }
}

fn main() {
    println!("=== Error Handling Example ===\n");

    // 1. Configuration errors are not runtime errors
    println!("1. Invalid selector:");
    let runtime = Runtime::new(MockApi::new());
    let config = SessionConfig::new()
        .with_selector(DeviceSelector::new().with_device_type(DeviceType::empty()));
    match Session::new(&runtime, config) {
        Err(err @ Error::InvalidConfig(_)) => println!("   {err} (kind: {:?})\n", err.kind()),
        other => println!("   unexpected: {other:?}\n"),
    }

    // 2. No matching hardware
    println!("2. No accelerator present:");
    let config = SessionConfig::new()
        .with_selector(DeviceSelector::new().with_device_type(DeviceType::ACCELERATOR));
    if let Err(err) = Session::new(&runtime, config) {
        println!("   {err}\n");
    }

    let Ok(session) = Session::new(&runtime, SessionConfig::new()) else {
        eprintln!("mock runtime has no device");
        return;
    };

    // 3. Build failures carry the compiler log
    println!("3. Build failure:");
    match build_kernel(&session, BROKEN, "scale") {
        Err(AppError::Build { name, log }) => println!("   {name}: {}\n", log.trim()),
        other => println!("   unexpected: {other:?}\n"),
    }

    // 4. Branch on the kind; the native status stays available
    println!("4. Allocation failures:");
    let mock = MockApi::new();
    let runtime = Runtime::new(mock.clone());
    let Ok(session) = Session::new(&runtime, SessionConfig::new()) else {
        return;
    };
    mock.inject_failure("clCreateBuffer", Status::MEM_OBJECT_ALLOCATION_FAILURE);
    for attempt in 1..=2 {
        match session.buffer::<f32>(MemFlags::READ_WRITE, 1 << 20) {
            Ok(buffer) => {
                println!("   attempt {attempt}: allocated {} elements", buffer.len());
                buffer.release();
            }
            Err(err) => {
                let advice = match err.kind() {
                    Some(ErrorKind::OutOfDeviceMemory) => "free device buffers and retry",
                    Some(kind) if kind.is_allocation_failure() => "reduce host pressure",
                    Some(ErrorKind::BuildProgramFailure) => "inspect the build log",
                    _ => "give up",
                };
                println!(
                    "   attempt {attempt}: {err} (status {:?}) -> {advice}",
                    err.status()
                );
            }
        }
    }

    println!("\n=== Example Complete ===");
}
