//! Custom error types for the session store

use common::ApiError;
use thiserror::Error;

/// Failure of a login or registration attempt
///
/// `Display` yields a message suitable for showing to the user as is.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Input rejected before any request was sent
    #[error("{0}")]
    Invalid(String),

    /// The server refused the attempt or could not be reached
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl AuthError {
    /// Wrap an API failure, preferring the server's own message
    pub fn rejected(source: ApiError, fallback: &str) -> Self {
        AuthError::Rejected {
            message: source.display_or(fallback).to_string(),
            source,
        }
    }

    /// Message for direct display
    pub fn message(&self) -> &str {
        match self {
            AuthError::Invalid(message) | AuthError::Rejected { message, .. } => message,
        }
    }

    /// HTTP status of the server's answer, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Invalid(_) => None,
            AuthError::Rejected { source, .. } => source.status(),
        }
    }
}

/// Type alias for session store results
pub type AuthResult<T> = Result<T, AuthError>;
