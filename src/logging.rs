use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use crate::config::Settings;

/// Sends `tracing` output to a daily rolling file; the terminal belongs to
/// the UI. `STASHPEEK_LOG` overrides the configured level. Keep the returned
/// guard alive until exit or buffered lines are lost.
pub fn init_logging(settings: &Settings) -> Result<WorkerGuard> {
    let log_dir = settings.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let filter = EnvFilter::try_from_env("STASHPEEK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let file_appender = tracing_appender::rolling::daily(&log_dir, "stashpeek.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
