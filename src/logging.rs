//! File-based tracing setup.
//!
//! The terminal UI owns stdout, so logs go to a daily-rolling file under
//! `<data_dir>/token-dash/logs` (or `--log-dir`). The level comes from
//! `RUST_LOG` and defaults to `info`.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "token-dash.log";

/// Default log directory.
pub fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;

    Ok(data_dir.join("token-dash").join("logs"))
}

/// Install the global subscriber. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init_logging(dir: &Path) -> Result<WorkerGuard> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
