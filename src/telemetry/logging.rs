//! Logging configuration and initialization
//!
//! Console output is compact text by default or JSON on request. File output
//! goes through a non-blocking `tracing-appender` writer so the render loop
//! never waits on disk.
//!
//! # Environment Variables
//!
//! - `GALLERY_LOG`: filter directives (e.g. `debug`, `info,plaque_gallery::scene=trace`).
//!   Falls back to `RUST_LOG`, then to `LogConfig::default_level`.
//! - `GALLERY_LOG_FORMAT`: `json` for JSON console output
//! - `GALLERY_LOG_FILE`: also write logs to this file

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

const FILTER_ENV: &str = "GALLERY_LOG";
const FORMAT_ENV: &str = "GALLERY_LOG_FORMAT";
const FILE_ENV: &str = "GALLERY_LOG_FILE";

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Also log to `file_path` (default: false)
    pub file_enabled: bool,
    /// Log file location; `plaque-gallery.log` in the working directory if unset
    pub file_path: Option<PathBuf>,
    /// JSON console output (default: false)
    pub json_format: bool,
    /// Filter used when no environment filter is set (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_enabled: false,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Defaults overridden by `GALLERY_LOG_FORMAT` and `GALLERY_LOG_FILE`
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(format) = lookup(FORMAT_ENV) {
            self.json_format = format.eq_ignore_ascii_case("json");
        }
        if let Some(path) = lookup(FILE_ENV).filter(|p| !p.trim().is_empty()) {
            self.file_enabled = true;
            self.file_path = Some(PathBuf::from(path));
        }
        self
    }

    fn log_file(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("plaque-gallery.log"))
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive until
/// the program exits.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let mut file_guard = None;
    let file_layer = if config.file_enabled {
        let log_path = config.log_file();
        let file = std::fs::File::create(&log_path)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        file_guard = Some(guard);
        eprintln!("Logging to file: {}", log_path.display());

        Some(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false),
        )
    } else {
        None
    };

    let (json_layer, console_layer) = match (config.console_enabled, config.json_format) {
        (false, _) => (None, None),
        (true, true) => (
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            ),
            None,
        ),
        (true, false) => (
            None,
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(json_layer)
        .with(console_layer)
        .try_init()?;

    tracing::info!(
        target: "plaque_gallery",
        version = env!("CARGO_PKG_VERSION"),
        json_format = config.json_format,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(file_guard)
}
