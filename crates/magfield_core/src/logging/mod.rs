//! Logging setup for the analyzer.
//!
//! Everything logs through `tracing`. The binary installs one global
//! subscriber at startup:
//! - `RUST_LOG` overrides the configured level
//! - human-readable output goes to stderr
//! - optionally, a daily rolling file under the logs folder

mod types;

pub use types::LogLevel;

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix for the rolling log file.
const LOG_FILE_PREFIX: &str = "magfield-analyzer.log";

/// Initialize the global subscriber with stderr output only.
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(env_filter(default_level))
        .init();
}

/// Initialize the global subscriber with stderr output plus a daily log file
/// in `logs_dir`.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the program. Returns `None` when only stderr logging could be
/// set up.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = fs::create_dir_all(logs_dir) {
        eprintln!(
            "Warning: Failed to create logs folder {}: {}. Logging to stderr only.",
            logs_dir.display(),
            e
        );
        init_tracing(default_level);
        return None;
    }

    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .try_init()
        .ok()
        .map(|()| guard)
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)))
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
