use std::env;
use std::io;
use std::path::PathBuf;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default directory for rolling log files when `LOG_DIR` is unset.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Installs the global subscriber: ANSI console output plus a JSON file
/// layer rolled daily under `LOG_DIR`, named after `app_name`.
///
/// The returned guard flushes the file writer on drop; keep it alive in
/// `main` for the lifetime of the program.
pub fn setup_logging(app_name: &str) -> io::Result<WorkerGuard> {
    // Get log level from environment variable or use default
    let log_level: String = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, app_name);
    let (non_blocking_appender, guard) = non_blocking(file_appender);

    let console_layer = fmt::layer().with_target(true).with_ansi(true);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_appender)
        .json();

    let env_filter: EnvFilter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    info!(app = app_name, log_dir = %log_dir.display(), "Logging initialized with level: {}", log_level);
    Ok(guard)
}

fn log_dir() -> PathBuf {
    env::var("LOG_DIR")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}
