// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Example: Logging Setup
//!
//! This example demonstrates how to configure rust-cl-core's tracing output
//! and what the library logs for a small workload.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example logging_setup
//! RUST_LOG=rust_cl_core=trace cargo run --example logging_setup
//! ```

use rust_cl_core::logging::{debug, info, log_transfer, warn, LogLevel, TransferDirection};
use rust_cl_core::mock::MockApi;
use rust_cl_core::{
    init_logging, LogConfig, MemFlags, RefCounted, Result, Runtime, Session, SessionConfig,
    ValidatableConfig,
};

fn main() -> Result<()> {
    println!("=== Logging Setup Example ===\n");

    // 1. Builder pattern for custom configuration
    println!("1. Builder pattern:");
    let config = LogConfig::new()
        .with_level(LogLevel::Debug)
        .with_transfers()
        .with_timestamps(false)
        .with_file_line(true);
    println!("   filter: {}\n", config.filter_string());

    // 2. Preset configurations
    println!("2. Preset configurations:");
    println!("   development: {}", LogConfig::development().filter_string());
    println!("   production:  {}", LogConfig::production().filter_string());
    println!("   testing:     {}\n", LogConfig::testing().filter_string());

    // 3. Invalid directives are rejected before anything is installed
    println!("3. Validation:");
    let bad = LogConfig::new().with_target_level("rust_cl=[{", LogLevel::Trace);
    match bad.validate() {
        Ok(()) => println!("   accepted\n"),
        Err(err) => println!("   rejected: {err}\n"),
    }

    // 4. Initialize logging (only the first call per process installs a subscriber)
    println!("4. Initializing logging (output appears on stderr):");
    init_logging(&config)?;
    init_logging(&LogConfig::production())?;
    println!();

    // 5. Library records: discovery at info, object lifetimes at debug,
    //    transfers on the rust_cl::transfer target
    println!("5. Library output for a short session:");
    let runtime = Runtime::new(MockApi::new());
    let session = Session::new(&runtime, SessionConfig::new().with_verbose(true))?;
    let buffer = session.buffer_from(MemFlags::READ_WRITE, &[1u32, 2, 3, 4])?;
    let values = session.read_all(&buffer)?;
    buffer.release();
    drop(session);
    println!("   read back {values:?}\n");

    // 6. Structured application records through the re-exported macros
    println!("6. Structured logging with fields:");
    let work_items = 1024;
    info!(work_items, "dispatch configured");
    debug!(work_items, local = 64, "work-group shape");
    warn!("falling back to the mock runtime");
    log_transfer(TransferDirection::HostToDevice, 4096, false);
    println!();

    // 7. Environment variable override
    println!("7. Environment variable configuration:");
    println!("   Set RUST_LOG to override the configured filter:");
    println!("     RUST_LOG=debug                          - debug and above");
    println!("     RUST_LOG=rust_cl::transfer=trace,info   - transfers only");
    println!("     RUST_LOG=rust_cl_core=trace             - every native query");
    println!();

    println!("=== Example Complete ===");
    Ok(())
}
