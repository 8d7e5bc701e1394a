//! Thin HTTP client for the catalog REST API
//!
//! `ApiClient` joins paths onto the configured base URL, attaches a bearer
//! token when one is supplied, and turns every non-2xx response into a typed
//! [`ApiError`]. It never retries. The actual HTTP exchange goes through the
//! [`Transport`] trait so stores can be exercised without a server.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// A request relative to the API base URL
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Appended to `path` one percent-encoded segment each
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a caller-supplied value, such as an id, as a single path segment
    ///
    /// `/`, `?` and `#` are encoded, so the value can never leave its segment.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    /// Append a query parameter
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Request(format!("failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach `Authorization: Bearer <token>` when a token is present
    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

// Keeps bearer tokens out of logs
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("segments", &self.segments)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("authenticated", &self.bearer.is_some())
            .finish()
    }
}

/// Fully resolved request handed to a transport
#[derive(Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("body", &self.body)
            .field("authenticated", &self.bearer.is_some())
            .finish()
    }
}

/// Raw response: status code and body text
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Response with a JSON body
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange
///
/// Implementations return `ApiError::Network` when no response was received
/// and otherwise hand back the response untouched, whatever its status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> ApiResult<TransportResponse>;
}

/// Transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport honouring the configured timeout
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        let mut builder = self.client.request(request.method, request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

/// Client for the catalog REST API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client talking HTTP to the configured base URL
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(&config.api_url, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the request's path, segments and query against the base URL
    pub fn endpoint(&self, request: &ApiRequest) -> ApiResult<Url> {
        if let Some(bad) = request.segments.iter().find(|s| is_dot_segment(s)) {
            return Err(ApiError::Request(format!("invalid path segment {bad:?}")));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Request(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Request(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(request.path.split('/').filter(|part| !part.is_empty()))
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Send a request and return the JSON body (`null` when empty)
    pub async fn request(&self, request: ApiRequest) -> ApiResult<Value> {
        let url = self.endpoint(&request)?;
        let method = request.method.clone();
        debug!(
            "{} {} (authenticated: {})",
            method,
            url,
            request.bearer.is_some()
        );

        let response = self
            .transport
            .execute(TransportRequest {
                method: request.method,
                url: url.clone(),
                body: request.body,
                bearer: request.bearer,
            })
            .await
            .inspect_err(|e| warn!("{} {} failed: {}", method, url, e))?;

        if !response.is_success() {
            let err = ApiError::from_response(response.status, &response.body);
            warn!("{} {} returned {}", method, url, err);
            return Err(err);
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Decode(format!("{method} {url}: {e}")))
    }

    /// Send a request and decode the body into `T`
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let path = request.path.clone();
        let value = self.request(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Empty, `.` and `..` segments (also percent-encoded dots) would be
/// normalised away by URL parsing and move the request to another resource
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().replace("%2e", ".").as_str(),
        "" | "." | ".."
    )
}
