//! Client configuration loaded once at startup
//!
//! Settings come from `MOVIEDB_*` environment variables. Only the API base
//! URL is required; everything else has a default.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment};
use reqwest::Url;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Prefix shared by every environment variable this crate reads
pub const ENV_PREFIX: &str = "MOVIEDB";

/// Default login endpoint
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Default registration endpoint
pub const DEFAULT_REGISTER_PATH: &str = "/auth/register";

/// Default number of movies per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Configuration for the API client and the stores built on it
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:5000/api`
    pub api_url: String,
    /// Path of the login endpoint, relative to `api_url`
    pub login_path: String,
    /// Path of the registration endpoint, relative to `api_url`
    pub register_path: String,
    /// Movies per page for unparameterised listings
    pub page_size: u32,
    /// Optional per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Directory holding the persisted session record
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MOVIEDB_API_URL`: API base URL (required)
    /// - `MOVIEDB_LOGIN_PATH`: login endpoint (default: "/auth/login")
    /// - `MOVIEDB_REGISTER_PATH`: register endpoint (default: "/auth/register")
    /// - `MOVIEDB_PAGE_SIZE`: listing page size (default: 12)
    /// - `MOVIEDB_REQUEST_TIMEOUT_SECS`: request timeout (default: none)
    /// - `MOVIEDB_SESSION_DIR`: session storage directory (default: `$HOME/.moviedb`)
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Build the configuration from an explicit environment source
    pub fn from_environment(environment: Environment) -> ConfigResult<Self> {
        let settings = Config::builder()
            .set_default("login_path", DEFAULT_LOGIN_PATH)?
            .set_default("register_path", DEFAULT_REGISTER_PATH)?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))?
            .add_source(environment.try_parsing(true))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration pointing at `api_url` with every other setting defaulted
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            register_path: DEFAULT_REGISTER_PATH.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: None,
            session_dir: None,
        }
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(())
    }

    /// Request timeout, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Directory for the persisted session, falling back to `$HOME/.moviedb`
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".moviedb")
        })
    }
}
