// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Logging setup and structured log helpers.
//!
//! ## Why This Module Exists
//!
//! Every layer of a compute application wants diagnostics from the binding:
//! handle creation and release, discovery results, build failures, transfer
//! sizes and kernel timings. This module provides:
//!
//! 1. **Log initialization**: one function configuring a `tracing-subscriber` fmt layer
//! 2. **Structured helpers**: stable targets and field names for transfers and profiles
//!
//! ## Targets
//!
//! - `rust_cl::transfer` - one `trace` record per enqueued transfer
//! - `rust_cl::profiling` - one `info` record per logged command profile
//!
//! Everything else logs under the module path (`rust_cl_core::...`). Handle
//! lifecycle is at `debug`, retains and info queries at `trace`, discovery and
//! successful builds at `info`, build failures at `warn`, and the record
//! emitted right before a precondition panic at `error`.
//!
//! ## Design Decisions
//!
//! - **tracing-based**: Uses the `tracing` ecosystem for structured logging
//! - **Environment-driven**: `RUST_LOG` replaces the configured filter entirely
//! - **Zero-cost when disabled**: All logging compiles to no-ops when level is filtered

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};
use crate::event::ProfilingTimes;
use crate::traits::ValidatableConfig;

/// Target of transfer records.
pub const TRANSFER_TARGET: &str = "rust_cl::transfer";

/// Target of profiling records.
pub const PROFILING_TARGET: &str = "rust_cl::profiling";

/// Configuration for logging initialization.
///
/// Development wants verbose colored output, production plain lines for log
/// ingestion, tests as little as possible; the presets cover the three.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub default_level: LogLevel,
    /// Extra filter directives, e.g. `rust_cl::transfer=trace`.
    pub directives: Vec<String>,
    /// Include timestamps in log output.
    pub with_timestamps: bool,
    /// Include target (module path) in log output.
    pub with_target: bool,
    /// Include source file and line numbers.
    pub with_file_line: bool,
    /// Use ANSI colors (disable for file output).
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            directives: Vec::new(),
            with_timestamps: true,
            with_target: true,
            with_file_line: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Create a new logging configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default log level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Set the level of one target, overriding the default level for it.
    #[must_use]
    pub fn with_target_level(mut self, target: &str, level: LogLevel) -> Self {
        self.directives
            .push(format!("{target}={}", level.as_filter_str()));
        self
    }

    /// Log every buffer transfer (`rust_cl::transfer` at trace).
    #[must_use]
    pub fn with_transfers(self) -> Self {
        self.with_target_level(TRANSFER_TARGET, LogLevel::Trace)
    }

    /// Enable or disable timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.with_timestamps = enable;
        self
    }

    /// Enable or disable source file and line numbers.
    #[must_use]
    pub fn with_file_line(mut self, enable: bool) -> Self {
        self.with_file_line = enable;
        self
    }

    /// Show or hide the module path of each record.
    #[must_use]
    pub fn with_module_target(mut self, enable: bool) -> Self {
        self.with_target = enable;
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    /// Configuration preset for development.
    ///
    /// Debug level with colors and file/line info.
    #[must_use]
    pub fn development() -> Self {
        Self::new()
            .with_level(LogLevel::Debug)
            .with_file_line(true)
    }

    /// Configuration preset for production.
    ///
    /// Info level without colors or targets, profiling records kept.
    #[must_use]
    pub fn production() -> Self {
        Self::new()
            .with_target_level(PROFILING_TARGET, LogLevel::Info)
            .with_module_target(false)
            .with_ansi(false)
    }

    /// Configuration preset for testing.
    ///
    /// Warnings only, plain lines without timestamps.
    #[must_use]
    pub fn testing() -> Self {
        Self::new()
            .with_level(LogLevel::Warn)
            .with_timestamps(false)
            .with_module_target(false)
            .with_ansi(false)
    }

    /// The filter string this configuration installs when `RUST_LOG` is unset.
    #[must_use]
    pub fn filter_string(&self) -> String {
        std::iter::once(self.default_level.as_filter_str().to_string())
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl ValidatableConfig for LogConfig {
    fn validate(&self) -> Result<()> {
        EnvFilter::try_new(self.filter_string())
            .map(drop)
            .map_err(|e| Error::invalid_config(format!("log filter: {e}")))
    }
}

/// Log level enumeration.
///
/// Maps to tracing levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and above.
    Warn,
    /// Informational messages and above.
    #[default]
    Info,
    /// Debug messages and above.
    Debug,
    /// All messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    fn as_filter_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Guard ensuring logging is only initialized once.
static INIT_LOGGING: Once = Once::new();

/// Initialize logging.
///
/// Installs a global `tracing-subscriber` fmt subscriber. Only the first call
/// in a process has an effect; later calls validate their config and return.
///
/// `RUST_LOG`, when set, replaces the configured filter.
///
/// # Errors
///
/// Returns `Error::InvalidConfig` if a configured directive does not parse.
///
/// ## Example
///
/// ```rust
/// use rust_cl_core::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::testing().with_transfers())?;
/// # Ok::<(), rust_cl_core::Error>(())
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    config.validate()?;
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.filter_string()))
            .unwrap_or_else(|_| EnvFilter::new(config.default_level.as_filter_str()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_file(config.with_file_line)
            .with_line_number(config.with_file_line);

        // try_init: a test harness or host application may own the global subscriber
        let installed = if config.with_timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        };
        if installed.is_err() {
            tracing::debug!("global subscriber already set; logging config ignored");
        }
    });
    Ok(())
}

/// Direction of a host/device transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Host memory to a device buffer.
    HostToDevice,
    /// Device buffer to host memory.
    DeviceToHost,
}

impl TransferDirection {
    fn as_str(self) -> &'static str {
        match self {
            Self::HostToDevice => "host_to_device",
            Self::DeviceToHost => "device_to_host",
        }
    }
}

/// Log one enqueued transfer.
///
/// ## Arguments
///
/// * `direction` - Which way the bytes move
/// * `bytes` - Transfer size in bytes
/// * `blocking` - Whether the enqueue blocked until completion
pub fn log_transfer(direction: TransferDirection, bytes: usize, blocking: bool) {
    tracing::trace!(
        target: TRANSFER_TARGET,
        direction = direction.as_str(),
        bytes,
        blocking,
        "Buffer transfer"
    );
}

/// Log the profiling timestamps of one command.
///
/// ## Arguments
///
/// * `label` - What the command was (kernel name, "read", ...)
/// * `times` - Timestamps from [`crate::Event::profile`]
#[allow(clippy::cast_precision_loss)]
pub fn log_profiling(label: &str, times: &ProfilingTimes) {
    let duration_us = times.duration_ns() as f64 / 1_000.0;
    let latency_us = times.latency_ns() as f64 / 1_000.0;

    tracing::info!(
        target: PROFILING_TARGET,
        label,
        duration_us = format!("{duration_us:.3}"),
        latency_us = format!("{latency_us:.3}"),
        queued = times.queued,
        ended = times.ended,
        "Command profile"
    );
}

// Re-export tracing macros for convenience so crates don't need to depend on tracing directly
pub use tracing::{debug, error, info, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(matches!(config.default_level, LogLevel::Info));
        assert!(config.with_timestamps);
        assert!(config.with_ansi);
        assert_eq!(config.filter_string(), "info");
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new()
            .with_level(LogLevel::Debug)
            .with_transfers()
            .with_timestamps(false)
            .with_file_line(true)
            .with_ansi(false);

        assert!(matches!(config.default_level, LogLevel::Debug));
        assert!(!config.with_timestamps);
        assert!(config.with_file_line);
        assert!(!config.with_ansi);
        assert_eq!(config.filter_string(), "debug,rust_cl::transfer=trace");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_config_presets() {
        let dev = LogConfig::development();
        assert!(matches!(dev.default_level, LogLevel::Debug));
        assert!(dev.with_file_line);

        let prod = LogConfig::production();
        assert!(matches!(prod.default_level, LogLevel::Info));
        assert!(!prod.with_ansi);
        assert_eq!(prod.filter_string(), "info,rust_cl::profiling=info");

        let test = LogConfig::testing();
        assert!(matches!(test.default_level, LogLevel::Warn));
        assert!(!test.with_timestamps);
    }

    #[test]
    fn test_invalid_directive_rejected() {
        let mut config = LogConfig::testing();
        config.directives.push("rust_cl=[{".to_string());
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(init_logging(&config).is_err());
    }

    #[derive(Clone, Default)]
    struct Capture(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_transfer_records_match_configured_filter() {
        let capture = Capture::default();
        let writer = capture.clone();
        let filter = LogConfig::new()
            .with_level(LogLevel::Error)
            .with_transfers()
            .filter_string();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            log_transfer(TransferDirection::DeviceToHost, 4096, false);
            tracing::info!("filtered out");
        });

        let output = String::from_utf8_lossy(&capture.0.lock()).into_owned();
        assert!(output.contains(TRANSFER_TARGET), "{output}");
        assert!(output.contains("bytes=4096"), "{output}");
        assert!(!output.contains("filtered out"), "{output}");
    }

    #[test]
    fn test_log_helpers_without_subscriber() {
        log_transfer(TransferDirection::HostToDevice, 4096, true);
        log_profiling(
            "copy",
            &ProfilingTimes {
                queued: 1,
                submitted: 2,
                started: 3,
                ended: 4,
                completed: 4,
            },
        );
    }
}
