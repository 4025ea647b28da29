//! Logging & crash reporting for the photo viewer
//!
//! Provides structured logging, log-file housekeeping and a panic hook that
//! writes crash reports.

mod logging;
mod panic_hook;

pub use logging::{cleanup_old_logs, init_logging, LogGuard};
pub use panic_hook::init_panic_hook;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, used when `RUST_LOG` is not set
    pub level: String,
    /// Write JSON logs to daily rolling files
    pub file_logging: bool,
    /// Override for the log directory
    pub directory: Option<PathBuf>,
    /// Log files older than this many days are removed by `init`
    pub retention_days: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
            directory: None,
            retention_days: 7,
        }
    }
}

impl LogConfig {
    /// Resolved log directory
    pub fn log_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(log_dir)
    }
}

/// Get the default log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "Wayfarer", "PhotoViewer")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize logging, prune stale log files and install the panic hook.
///
/// The returned guard must be kept alive for as long as file logging should
/// keep flushing.
pub fn init(config: &LogConfig) -> anyhow::Result<LogGuard> {
    let guard = init_logging(config)?;
    init_panic_hook();

    if config.file_logging {
        if let Err(e) = cleanup_old_logs(&config.log_dir(), config.retention_days) {
            tracing::warn!("Failed to cleanup old logs: {}", e);
        }
    }

    Ok(guard)
}
