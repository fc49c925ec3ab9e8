//! Logging setup for the command line tool.
//!
//! Console output goes to stderr so that command results on stdout stay
//! machine-readable. An optional log file receives the same events through a
//! non-blocking writer.

use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{
    InitError,
    RollingFileAppender,
    Rotation,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{
    SubscriberInitExt,
    TryInitError,
};
use tracing_subscriber::{
    EnvFilter,
    Layer,
    fmt,
};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Error, Debug)]
pub enum TracingError {
    #[error("Invalid log file path: {}", .0.display())]
    InvalidLogFile(PathBuf),

    #[error("Failed to open log file: {0}")]
    Appender(#[from] InitError),

    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Builds the `RUST_LOG` filter, falling back to [`DEFAULT_LOG_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the log file when dropped; keep it alive for the
/// lifetime of the program.
pub fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, TracingError> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .with_filter(env_filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path.file_name().ok_or_else(|| TracingError::InvalidLogFile(path.to_path_buf()))?;
            let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_target(true).with_writer(writer).with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console_layer).with(file_layer).try_init()?;

    if let Some(path) = log_file {
        tracing::debug!(path = %path.display(), "Writing logs to file");
    }
    Ok(guard)
}
