//! Custom error types for the catalog store

use common::ApiError;
use thiserror::Error;

/// Failure of a catalog operation
///
/// Validation, authorization and network failures all collapse into a
/// display message; the underlying [`ApiError`] stays reachable as the source.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct CatalogError {
    message: String,
    #[source]
    source: ApiError,
}

impl CatalogError {
    /// Wrap an API failure, preferring the server's own message
    pub fn new(source: ApiError, fallback: &str) -> Self {
        Self {
            message: source.display_or(fallback).to_string(),
            source,
        }
    }

    /// Message for direct display
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.source.is_unauthorized()
    }

    pub fn api_error(&self) -> &ApiError {
        &self.source
    }
}

/// Reason a movie form could not become a [`MovieInput`](crate::MovieInput)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be {expected}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },
}

/// Type alias for catalog results
pub type CatalogResult<T> = Result<T, CatalogError>;
