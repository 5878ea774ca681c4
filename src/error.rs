// src/error.rs

//! Unified error handling for the alert relay.

use std::fmt;

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse error classes the orchestrator's failure policy decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Fetch,
    Parse,
    Persistence,
    Delivery,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "config",
            ErrorKind::Fetch => "fetch",
            ErrorKind::Parse => "parse",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Delivery => "delivery",
        };
        f.write_str(name)
    }
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A listing or detail page could not be retrieved
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Expected page structure was absent
    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    /// Fingerprint could not be read or durably written
    #[error("Persistence error for '{id}': {message}")]
    Persistence { id: String, message: String },

    /// Messaging collaborator rejected or failed to send a part
    #[error("Delivery error to {destination} (part {part}): {message}")]
    Delivery {
        destination: String,
        part: usize,
        message: String,
    },

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error for the given URL.
    pub fn parse(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a persistence error for a source id.
    pub fn persistence(id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Persistence {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Create a delivery error for the 1-based part number.
    pub fn delivery(
        destination: impl Into<String>,
        part: usize,
        message: impl fmt::Display,
    ) -> Self {
        Self::Delivery {
            destination: destination.into(),
            part,
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Classify this error for the failure policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) | AppError::Toml(_) | AppError::Selector { .. } => {
                ErrorKind::Config
            }
            AppError::Fetch { .. } => ErrorKind::Fetch,
            AppError::Parse { .. } | AppError::Url(_) => ErrorKind::Parse,
            AppError::Persistence { .. } => ErrorKind::Persistence,
            AppError::Delivery { .. } => ErrorKind::Delivery,
        }
    }
}
