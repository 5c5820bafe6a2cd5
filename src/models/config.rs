//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `catalog.source`.
pub const ENV_SCHEMA_SOURCE: &str = "SCHEMA_SOURCE";
/// Environment variable overriding `notifications.webhook_url`.
pub const ENV_WEBHOOK_URL: &str = "SCHEMA_WEBHOOK_URL";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Where the schema comes from and how often to refresh it
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Listing normalization toggles
    #[serde(default)]
    pub classifier: ClassifierOptions,

    /// Schema change notifications
    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply environment overrides on top of file values.
    pub fn apply_env(&mut self) {
        if let Ok(source) = std::env::var(ENV_SCHEMA_SOURCE) {
            if !source.trim().is_empty() {
                self.catalog.source = source;
            }
        }
        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL) {
            self.notifications.webhook_url = Some(url).filter(|u| !u.trim().is_empty());
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.catalog.source.trim().is_empty() {
            return Err(AppError::validation("catalog.source is empty"));
        }
        if self.catalog.refresh_interval_secs == 0 {
            return Err(AppError::validation(
                "catalog.refresh_interval_secs must be > 0",
            ));
        }
        if self.notifications.page_size == 0 {
            return Err(AppError::validation("notifications.page_size must be > 0"));
        }
        if self.notifications.max_backoff_ms < self.notifications.fallback_retry_ms {
            return Err(AppError::validation(
                "notifications.max_backoff_ms must be >= fallback_retry_ms",
            ));
        }
        if let Some(url) = &self.notifications.webhook_url {
            let parsed = url::Url::parse(url)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::validation(format!(
                    "notifications.webhook_url must be http(s), got {}",
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Schema source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// `http(s)://` URL or filesystem path of the schema document
    #[serde(default = "defaults::catalog_source")]
    pub source: String,

    /// Seconds between refreshes
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: defaults::catalog_source(),
            refresh_interval_secs: defaults::refresh_interval(),
        }
    }
}

/// Independent normalization toggles for listing classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Treat festivized items as plain ones
    #[serde(default)]
    pub normalize_festivized: bool,

    /// Do not elevate "Strange"-typed non-Strange items to a secondary quality
    #[serde(default)]
    pub normalize_strange_as_second_quality: bool,

    /// Ignore paint
    #[serde(default)]
    pub normalize_painted: bool,
}

/// Webhook notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook target; notifications are disabled when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "defaults::username")]
    pub username: String,

    #[serde(default)]
    pub avatar_url: Option<String>,

    /// Embed sidebar color
    #[serde(default = "defaults::embed_color")]
    pub embed_color: u32,

    /// Entries per notification
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Courtesy delay before the first send after idling
    #[serde(default = "defaults::base_delay")]
    pub base_delay_ms: u64,

    /// Wait after a rate limit without a server-provided delay
    #[serde(default = "defaults::fallback_retry")]
    pub fallback_retry_ms: u64,

    /// Cap for repeated fallback waits
    #[serde(default = "defaults::max_backoff")]
    pub max_backoff_ms: u64,

    /// How long a delivered notification suppresses duplicates
    #[serde(default = "defaults::suppression_ttl")]
    pub suppression_ttl_secs: u64,

    /// Idempotency key prefix
    #[serde(default = "defaults::cache_prefix")]
    pub cache_prefix: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: defaults::username(),
            avatar_url: None,
            embed_color: defaults::embed_color(),
            page_size: defaults::page_size(),
            base_delay_ms: defaults::base_delay(),
            fallback_retry_ms: defaults::fallback_retry(),
            max_backoff_ms: defaults::max_backoff(),
            suppression_ttl_secs: defaults::suppression_ttl(),
            cache_prefix: defaults::cache_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; econ-schema/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn catalog_source() -> String {
        "data/schema.json".into()
    }
    pub fn refresh_interval() -> u64 {
        5 * 60
    }

    pub fn username() -> String {
        "Schema Watcher".into()
    }
    pub fn embed_color() -> u32 {
        0xF7_94_1D
    }
    pub fn page_size() -> usize {
        25
    }
    pub fn base_delay() -> u64 {
        1_000
    }
    pub fn fallback_retry() -> u64 {
        5_000
    }
    pub fn max_backoff() -> u64 {
        60_000
    }
    pub fn suppression_ttl() -> u64 {
        10 * 60
    }
    pub fn cache_prefix() -> String {
        "schema_notified".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
