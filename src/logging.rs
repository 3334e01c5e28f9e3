//! Tracing setup.
//!
//! The terminal is in raw mode on the alternate screen while the widgets
//! run, so log records go to a file through a non-blocking writer.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Install the global subscriber writing to `log_file`.
///
/// `RUST_LOG` takes precedence over `level`. The returned guard flushes
/// pending records when dropped and must be held until shutdown.
pub fn init(log_file: &Path, level: &str) -> Result<WorkerGuard> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter)
        .try_init();

    tracing::info!(path = %log_file.display(), "logging started");
    Ok(guard)
}
