// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Example: Device Query
//!
//! Lists every platform and device the runtime exposes, optionally filtered
//! by case-sensitive name substrings.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example device_query -- --device GPU
//! cargo run --example device_query --features opencl
//! RUST_LOG=rust_cl_core=debug cargo run --example device_query
//! ```

use std::process::ExitCode;

use clap::Parser;
use rust_cl_core::{get_platforms, init_logging, DeviceType, LogConfig, Platform, Result, Runtime};

/// Print the platforms and devices of the compute runtime
#[derive(Parser)]
#[command(name = "device_query")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Only show platforms whose name contains this string
    #[arg(long)]
    platform: Option<String>,

    /// Only show devices whose name contains this string
    #[arg(long)]
    device: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&LogConfig::production()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "opencl")]
fn runtime() -> Result<Runtime> {
    Runtime::opencl()
}

#[cfg(not(feature = "opencl"))]
fn runtime() -> Result<Runtime> {
    Ok(Runtime::new(rust_cl_core::mock::MockApi::new()))
}

fn run(cli: &Cli) -> Result<()> {
    let runtime = runtime()?;
    let platforms = get_platforms(&runtime)?;
    if platforms.is_empty() {
        println!("No platforms found.");
        return Ok(());
    }

    for platform in &platforms {
        let name = platform.name()?;
        if cli.platform.as_ref().is_some_and(|wanted| !name.contains(wanted.as_str())) {
            continue;
        }
        print_platform(platform, &name, cli.device.as_deref())?;
    }
    Ok(())
}

fn print_platform(platform: &Platform, name: &str, device_filter: Option<&str>) -> Result<()> {
    println!("Platform: {name}");
    println!("  vendor:     {}", platform.vendor()?);
    println!("  version:    {}", platform.version()?);
    println!("  profile:    {}", platform.profile()?);
    println!("  extensions: {}", platform.extensions()?.len());

    let devices = platform.devices(DeviceType::ALL_COMPUTE)?;
    if devices.is_empty() {
        println!("  (no devices)");
    }
    for device in devices {
        let device_name = device.name()?;
        if device_filter.is_some_and(|wanted| !device_name.contains(wanted)) {
            continue;
        }
        println!("  Device: {device_name}");
        println!("    type:              {:?}", device.device_type()?);
        println!("    vendor:            {}", device.vendor()?);
        println!("    driver:            {}", device.driver_version()?);
        println!("    compute units:     {}", device.max_compute_units()?);
        println!("    max work group:    {}", device.max_work_group_size()?);
        println!("    max work items:    {:?}", device.max_work_item_sizes()?);
        println!("    global memory:     {} MiB", device.global_mem_size()? >> 20);
        println!("    max allocation:    {} MiB", device.max_mem_alloc_size()? >> 20);
        println!("    compiler:          {}", device.compiler_available()?);
    }
    Ok(())
}
