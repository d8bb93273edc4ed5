// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

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

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Board fetch failed (transport, timeout or browser)
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Board answered with a non-200 status
    #[error("Upstream returned HTTP {status}: {snippet}")]
    UpstreamStatus { status: u16, snippet: String },

    /// Markup could not be treated as a document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Watermark could not be read or written
    #[error("State error: {0}")]
    State(String),

    /// A single webhook delivery failed
    #[error("Notify error for listing {listing_id}: {message}")]
    Notify { listing_id: u64, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a state store error.
    pub fn state(message: impl fmt::Display) -> Self {
        Self::State(message.to_string())
    }

    /// Create a notification error for one listing.
    pub fn notify(listing_id: u64, message: impl fmt::Display) -> Self {
        Self::Notify {
            listing_id,
            message: message.to_string(),
        }
    }

    /// Whether the error came from retrieving the board page.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::UpstreamStatus { .. } | Self::Http(_)
        )
    }
}
