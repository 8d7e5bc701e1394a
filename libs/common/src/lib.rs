//! Common library for the MovieDB client
//!
//! This crate provides the pieces shared by every store: the REST API client,
//! the error taxonomy, configuration loading, durable key-value storage for
//! the session record, and the credential seam between stores.
//!
//! ```rust,no_run
//! use common::{ApiClient, ApiRequest, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let client = ApiClient::new(&config)?;
//!     let page = client
//!         .request(ApiRequest::get("/movies").query("page", 1).query("limit", 12))
//!         .await?;
//!     println!("First page: {}", page);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod storage;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::{
    ApiClient, ApiRequest, ReqwestTransport, Transport, TransportRequest, TransportResponse,
};
pub use config::ClientConfig;
pub use credentials::{Anonymous, CredentialSource};
pub use error::{ApiError, ApiResult, ConfigError, ConfigResult, StorageError, StorageResult};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// HTTP method type used by [`ApiRequest`]
pub use reqwest::Method;
