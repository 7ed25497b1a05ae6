//! Logging integration for polysql.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-statement spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise a structured JSON format is used.
/// Installing a subscriber twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one statement build.
///
/// Every event the compiler emits while building the statement carries the
/// statement kind and table name.
///
/// # Examples
///
/// ```
/// use polysql_core::logging::statement_span;
///
/// let span = statement_span("select", "users");
/// let _guard = span.enter();
/// tracing::debug!("compiling");
/// ```
pub fn statement_span(kind: &str, table: &str) -> tracing::Span {
    tracing::debug_span!("statement", kind = kind, table = table)
}
