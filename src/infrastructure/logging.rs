use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{config::AppConfig, infrastructure::directories::ResolvedPaths};

const LOG_FILE_PREFIX: &str = "botdesk.log";

// The non-blocking writer stops flushing once its guard drops, so the
// guard lives for the whole process.
static GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Sets up the subscriber once: human-readable stdout plus a daily rolling
/// file in the logs directory. Later calls are no-ops.
pub fn init_tracing(config: &AppConfig, paths: &ResolvedPaths) -> Result<()> {
    if GUARD.get().is_some() {
        return Ok(());
    }

    let appender = tracing_appender::rolling::daily(&paths.logs_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    if GUARD.set(guard).is_err() {
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(build_filter(&config.logging.level))
        .with(fmt::layer().with_writer(io::stdout).with_target(true))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_ansi(false),
        )
        .init();

    tracing::info!(logs = %paths.logs_dir.display(), "tracing initialized");
    Ok(())
}

fn build_filter(configured_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
