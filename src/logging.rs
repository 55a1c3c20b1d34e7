//! File-based logging
//!
//! The TUI owns the terminal, so tracing output goes to a daily rotating
//! file instead of stdout.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "audiobook-rs";
pub const DEFAULT_FILTER: &str = "audiobook_rs=debug,symphonia=warn,warn";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/audiobook-rs.YYYY-MM-DD` with daily rotation.
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. The returned guard flushes the
/// writer on drop and must be held until exit.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", log_dir.display());

    Ok(guard)
}

/// Log an engine operation and its result
#[macro_export]
macro_rules! log_engine_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "Engine operation succeeded"),
            Err(e) => tracing::warn!(operation = $operation, error = %e, "Engine operation failed"),
        }
    };
}
