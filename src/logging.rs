use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config;

pub const LOG_FILE: &str = "pdfquiz.log";

pub fn log_dir() -> PathBuf {
    config::data_dir().join("logs")
}

/// Filter from `RUST_LOG` when set, otherwise from the configured level.
/// An unparseable directive falls back to `info`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a file-only subscriber; stdout belongs to the terminal UI.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(dir: &Path, level: &str) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}
