use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use chrono::Local;
use tracing::info;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_PREFIX: &str = "trading_bot";

/// The log file keeps debug detail for our own crates only.
const FILE_DIRECTIVES: &str = "warn,trading_bot=debug,exchanges=debug";

/// Holds the file writer's guard; buffered lines are flushed when it is dropped,
/// so `main` keeps it alive until exit.
pub struct TracingGuards {
    _file: WorkerGuard,
    pub log_file: PathBuf,
}

/// Console (stderr) gets `RUST_LOG` (default `info`), the file gets debug detail.
pub fn init_tracing(log_dir: &Path) -> io::Result<TracingGuards> {
    let (file_writer, file_guard, log_file) = custom_daily_file_appender(log_dir, LOG_PREFIX)?;

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_filter = EnvFilter::new(FILE_DIRECTIVES);

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(console_filter),
        )
        .try_init();

    info!("Logging initialized. Log file: {}", log_file.display());

    Ok(TracingGuards {
        _file: file_guard,
        log_file,
    })
}

/// Opens `<base_dir>/<prefix>.<YYYY-MM-DD>.log` for appending, creating the directory if needed.
fn custom_daily_file_appender(
    base_dir: &Path,
    prefix: &str,
) -> io::Result<(NonBlocking, WorkerGuard, PathBuf)> {
    fs::create_dir_all(base_dir)?;

    let date = Local::now().format("%Y-%m-%d").to_string();
    let path = base_dir.join(format!("{prefix}.{date}.log"));

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let (writer, guard) = non_blocking(file);
    Ok((writer, guard, path))
}
