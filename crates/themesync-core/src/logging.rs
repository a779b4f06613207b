//! Tracing subscriber setup

use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the filter directives
pub const LOG_ENV_VAR: &str = "THEMESYNC_LOG";

/// Default filter when [`LOG_ENV_VAR`] is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Filter from [`LOG_ENV_VAR`], falling back to [`DEFAULT_FILTER`]
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Build a subscriber writing to `writer`
pub fn subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);
    match format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}

/// Install the global subscriber (stderr)
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(format: LogFormat) -> ConfigResult<()> {
    tracing::subscriber::set_global_default(subscriber(format, env_filter(), std::io::stderr))
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
