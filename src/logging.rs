use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directory the rolling log files go to when none is given.
pub const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "doctor_scraper.log";
const DEFAULT_DIRECTIVE: &str = "doctor_scraper=info";

/// Filter from `RUST_LOG`, falling back to info for this crate only.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Human-readable events on stderr plus one JSON line per event in a
/// daily-rotated file under `log_dir`.
///
/// Dropping the returned guard flushes the file writer; hold it in `main`.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    // Stdout is reserved for the CLI's progress summaries.
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("could not create log directory {}: {}", log_dir.display(), e);
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    guard
}
