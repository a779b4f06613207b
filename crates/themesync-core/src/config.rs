//! Runtime configuration
//!
//! Resolution order: built-in defaults, then a TOML file, then
//! `THEMESYNC_*` environment variables.
//!
//! ```toml
//! base_url = "https://admin.example.com/api/interface-config"
//! strategy = "cache-first"
//! config_ttl_secs = 300
//! debounce_ms = 100
//! poll_interval_secs = 30
//! storage_path = "/var/lib/themesync/cache.json"
//! log_format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use themesync_remote::FetchStrategy;

use crate::error::{ConfigError, ConfigResult};
use crate::logging::LogFormat;

/// Environment variable overriding [`SyncConfig::base_url`]
pub const ENV_BASE_URL: &str = "THEMESYNC_BASE_URL";
/// Environment variable overriding [`SyncConfig::strategy`]
pub const ENV_STRATEGY: &str = "THEMESYNC_STRATEGY";
/// Environment variable overriding [`SyncConfig::config_ttl_secs`]
pub const ENV_CONFIG_TTL_SECS: &str = "THEMESYNC_CONFIG_TTL_SECS";
/// Environment variable overriding [`SyncConfig::debounce_ms`]
pub const ENV_DEBOUNCE_MS: &str = "THEMESYNC_DEBOUNCE_MS";
/// Environment variable overriding [`SyncConfig::poll_interval_secs`]
pub const ENV_POLL_SECS: &str = "THEMESYNC_POLL_SECS";
/// Environment variable overriding [`SyncConfig::storage_path`]
pub const ENV_STORAGE_PATH: &str = "THEMESYNC_STORAGE_PATH";

/// Synchronization engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Root URL of the configuration service
    pub base_url: String,
    /// Cache/network precedence for loads
    pub strategy: FetchStrategy,
    /// Document TTL in the memory and persistent caches
    pub config_ttl_secs: u64,
    /// Debounce window for live application of edits
    pub debounce_ms: u64,
    /// Remote divergence polling; `0` disables it
    pub poll_interval_secs: u64,
    /// HTTP request timeout
    pub request_timeout_secs: u64,
    /// Persistent cache file; memory-only when unset
    pub storage_path: Option<PathBuf>,
    /// Log output format
    pub log_format: LogFormat,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With service URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// With fetch strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// With document TTL (whole seconds)
    #[inline]
    #[must_use]
    pub fn with_config_ttl(mut self, ttl: Duration) -> Self {
        self.config_ttl_secs = ttl.as_secs();
        self
    }

    /// With debounce window (whole milliseconds)
    #[inline]
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With polling interval; `None` disables polling
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, every: Option<Duration>) -> Self {
        self.poll_interval_secs = every.map_or(0, |d| d.as_secs());
        self
    }

    /// With persistent cache file
    #[inline]
    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// With log format
    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Document TTL
    #[inline]
    #[must_use]
    pub fn config_ttl(&self) -> Duration {
        Duration::from_secs(self.config_ttl_secs)
    }

    /// Debounce window
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Polling interval, if enabled
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    /// HTTP request timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse TOML
    ///
    /// # Errors
    /// Returns error on malformed TOML, unknown keys or invalid values
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// Returns error if the file is unreadable or invalid
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply `THEMESYNC_*` environment overrides
    ///
    /// # Errors
    /// Returns error if an override does not parse
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    ///
    /// # Errors
    /// Returns error if an override does not parse
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_STRATEGY) {
            self.strategy = raw
                .parse()
                .map_err(|e: themesync_remote::SyncError| {
                    ConfigError::invalid(ENV_STRATEGY, &raw, e.to_string())
                })?;
        }
        if let Some(raw) = lookup(ENV_CONFIG_TTL_SECS) {
            self.config_ttl_secs = parse_u64(ENV_CONFIG_TTL_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEBOUNCE_MS) {
            self.debounce_ms = parse_u64(ENV_DEBOUNCE_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POLL_SECS) {
            self.poll_interval_secs = parse_u64(ENV_POLL_SECS, &raw)?;
        }
        if let Some(path) = lookup(ENV_STORAGE_PATH) {
            self.storage_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        self.validate()?;
        Ok(self)
    }

    /// Check field values
    ///
    /// # Errors
    /// Returns error for an empty base URL or a zero TTL
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url", &self.base_url, "must not be empty"));
        }
        if self.config_ttl_secs == 0 {
            return Err(ConfigError::invalid("config_ttl_secs", "0", "must be positive"));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/interface-config".to_string(),
            strategy: FetchStrategy::default(),
            config_ttl_secs: 300,
            debounce_ms: 100,
            poll_interval_secs: 30,
            request_timeout_secs: 10,
            storage_path: None,
            log_format: LogFormat::default(),
        }
    }
}

fn parse_u64(key: &str, raw: &str) -> ConfigResult<u64> {
    raw.trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::invalid(key, raw, e.to_string()))
}
