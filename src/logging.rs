// ==========================================
// Meat Production Analytics - logging
// ==========================================
// tracing-subscriber on stderr; stdout is reserved for command results.
// Filter from RUST_LOG, e.g. RUST_LOG=meat_analytics::importer=debug
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Upload spans carry `batch_ref`, so every
/// event of one upload can be grepped out of either format.
///
/// ```no_run
/// use meat_analytics::logging::{self, LogFormat};
/// logging::init_with(LogFormat::Json);
/// ```
pub fn init_with(format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.with_line_number(true).init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Debug level into the test harness writer; repeated calls are no-ops.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
