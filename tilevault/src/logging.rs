//! Logging initialization.
//!
//! Sets up the tracing stack: an `EnvFilter` honoring `RUST_LOG` (default
//! `info` globally, `debug` for this crate) and either a plain stderr
//! writer or a daily-rolling log file under the given directory.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing_appender::non_blocking::WorkerGuard;

/// Default filter directive when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,tilevault=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize logging to stderr.
pub fn init_stderr() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

/// Initialize logging to a daily-rolling file under `log_dir`.
///
/// The returned guard must be held for the lifetime of the process; log
/// lines are flushed when it drops.
pub fn init_file(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, "tilevault.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Ok(guard)
}
