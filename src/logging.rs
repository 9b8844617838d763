//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogFormat;
use crate::error::{AppError, AppResult};

/// Build the filter for `level`, rejecting malformed directives.
pub fn build_filter(level: &str) -> AppResult<EnvFilter> {
    EnvFilter::try_new(level).map_err(|e| AppError::Config(format!("Invalid log level '{level}': {e}")))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns `AppError::Config` if `level` is not a valid filter directive or
/// a global subscriber is already installed.
pub fn init_logging(level: &str, format: LogFormat) -> AppResult<()> {
    let filter = build_filter(level)?;

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to install logger: {e}")))
}
