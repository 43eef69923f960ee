//! Logging setup
//!
//! tracing-subscriber over stdout by default; a daily-rolling file
//! appender takes over when a log directory is configured.

use std::path::Path;

/// Initialize the logger with defaults (INFO to stdout)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// `log_level` accepts any tracing filter string ("info",
/// "tender_server=debug,warn"). An unparseable filter falls back to
/// INFO rather than failing startup.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level.unwrap_or("info"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    match log_dir.map(Path::new) {
        Some(dir) if dir.is_dir() => {
            let appender = tracing_appender::rolling::daily(dir, "tender-server");
            builder.with_writer(appender).with_ansi(false).init();
        }
        Some(dir) => {
            // Missing directory: log to stdout instead of failing startup
            builder.init();
            tracing::warn!(dir = %dir.display(), "Log directory not found, logging to stdout");
        }
        None => builder.init(),
    }
}
