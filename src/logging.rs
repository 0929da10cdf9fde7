//! Logging setup for the `casely` binary.
//!
//! Console output goes to stderr because stdout carries the machine-readable
//! summaries. When enabled, logs are also written to daily rolling files in the
//! platform data directory:
//!
//! - Linux: `~/.local/share/casely/logs`
//! - macOS: `~/Library/Application Support/casely/logs`
//! - Windows: `%APPDATA%/casely/logs`

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// How chatty the logs should be.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// 0 = info, 1 = debug, 2+ = trace
    pub verbose: u8,
    /// Only warnings and errors on the console
    pub quiet: bool,
    /// Also write rolling log files
    pub to_file: bool,
}

impl LogOptions {
    fn default_directive(self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

/// Gets the log directory path, creating it when missing
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join("casely").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }
    Ok(log_dir)
}

fn file_appender(log_dir: &std::path::Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log file appender"))
}

/// Initializes console logging and, if requested, rolling file logging.
///
/// `RUST_LOG` overrides the level chosen from `options`. A missing data
/// directory only disables file logging.
///
/// # Errors
///
/// Returns error if the filter is invalid or a subscriber is already installed.
pub fn init(options: LogOptions) -> Result<Option<PathBuf>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(options.default_directive()))
        .context("Failed to create env filter")?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let log_dir = if options.to_file {
        get_log_dir().ok()
    } else {
        None
    };

    let (all_logs_layer, error_logs_layer) = match &log_dir {
        Some(dir) => {
            let all = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(file_appender(dir, "casely")?);
            let errors = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(file_appender(dir, "error")?)
                .with_filter(EnvFilter::new("warn"));
            (Some(all), Some(errors))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install logging subscriber")?;

    if let Some(dir) = &log_dir {
        tracing::debug!("Logging initialized, log directory: {}", dir.display());
    }
    Ok(log_dir)
}
