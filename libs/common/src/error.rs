//! Custom error types for the common library
//!
//! This module defines the failure taxonomy shared by every store: transport
//! and HTTP failures surfaced by the API client, persistence failures from the
//! session storage, and configuration errors raised at startup.

use serde_json::Value;
use thiserror::Error;

/// Failure returned by the API client
///
/// Every variant that originates from a server response carries the status
/// code and, when the server sent one, its human-readable message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never reached the server or no response came back
    #[error("Network error: {0}")]
    Network(String),

    /// 401 or 403
    #[error("Authentication error ({status}): {}", display_message(.message))]
    Auth {
        status: u16,
        message: Option<String>,
    },

    /// 400, 409 or 422 carrying a field-level message
    #[error("Validation error ({status}): {}", display_message(.message))]
    Validation {
        status: u16,
        message: Option<String>,
    },

    /// Any other non-2xx response
    #[error("HTTP error ({status}): {}", display_message(.message))]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// A 2xx response whose body did not have the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The request could not be built; nothing was sent
    #[error("Invalid request: {0}")]
    Request(String),
}

fn display_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no message")
}

impl ApiError {
    /// Classify a non-2xx response
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            401 | 403 => ApiError::Auth { status, message },
            400 | 409 | 422 => ApiError::Validation { status, message },
            _ => ApiError::Http { status, message },
        }
    }

    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::Request(_) => None,
        }
    }

    /// Message sent by the server, suitable for direct display
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Auth { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::Http { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::Request(_) => None,
        }
    }

    /// Server message, or `fallback` when there is none
    pub fn display_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }

    /// True for a 401: the credential is no longer accepted
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Auth { status: 401, .. })
    }
}

/// Pull a display message out of an error body.
///
/// JSON `message` wins over JSON `error`; a non-JSON body is used as is.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .filter(|msg| !msg.is_empty())
            .map(str::to_string),
        Ok(Value::String(text)) if !text.is_empty() => Some(text),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Failure while reading or writing persisted client state
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Keys name files, so only a restricted alphabet is accepted
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The in-memory store lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error raised while loading or deserializing settings
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// The API base URL could not be parsed
    #[error("Invalid API base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Type alias for Result with ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
