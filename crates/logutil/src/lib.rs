//! Utilities for logging.

use tracing_subscriber::filter::EnvFilter;

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, single-line records for terminals.
    #[default]
    HumanReadable,
    /// One JSON object per record, for log shippers.
    Json,
}

/// Configure the global tracing subscriber.
///
/// `level` is the default max level; `RUST_LOG` overrides it when set.
/// Records go to stderr so they never interleave with program output.
///
/// May only be called once. Subsequent calls are ignored.
pub fn configure_global_logger(level: tracing::Level, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::HumanReadable => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    // A test harness may have installed a subscriber already.
    if result.is_err() {
        tracing::debug!("global logger already configured");
    }
}

/// Configure a logger for tests.
///
/// Does nothing if a global subscriber is already set.
pub fn init_test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
