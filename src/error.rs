// src/error.rs

//! Unified error handling for the schema toolkit.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Idempotency cache failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Listing or SKU could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Notification delivery failed
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Background task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }
}

/// Failure while turning a listing (or a SKU string) into an item descriptor.
///
/// Classification holds no state between calls, so none of these leave
/// anything behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing display name")]
    MissingDisplayName,

    #[error("could not get defindex of item \"{0}\"")]
    MissingIdentifier(String),

    #[error("unsupported app id {0}")]
    UnsupportedApp(u32),

    #[error("malformed sku \"{0}\"")]
    MalformedSku(String),

    #[error("unknown quality for item \"{0}\"")]
    UnknownQuality(String),

    #[error("unresolvable target for {0}")]
    UnresolvableTarget(String),

    #[error("unknown sku for item \"{0}\"")]
    UnknownSku(String),
}

impl DecodeError {
    /// Whether the caller sent something unusable, as opposed to a name the
    /// catalog could not resolve.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingDisplayName
                | Self::MissingIdentifier(_)
                | Self::UnsupportedApp(_)
                | Self::MalformedSku(_)
        )
    }
}

/// Outcome of a failed webhook delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Target asked us to slow down; the job is retried in place.
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Anything else; the job is dropped.
    #[error("{0}")]
    Permanent(String),
}

impl DeliveryError {
    pub fn permanent(message: impl std::fmt::Display) -> Self {
        Self::Permanent(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_vs_resolution_errors() {
        assert!(DecodeError::MissingDisplayName.is_input_error());
        assert!(DecodeError::MalformedSku("x".into()).is_input_error());
        assert!(!DecodeError::UnresolvableTarget("Kit".into()).is_input_error());
        assert!(!DecodeError::UnknownSku("Hat".into()).is_input_error());
    }

    #[test]
    fn test_decode_error_messages() {
        assert_eq!(
            DecodeError::UnresolvableTarget("Strangifier".into()).to_string(),
            "unresolvable target for Strangifier"
        );
        let app: AppError = DecodeError::MissingDisplayName.into();
        assert_eq!(app.to_string(), "Decode error: missing display name");
    }
}
