//! Scripted transport for exercising stores without a server
//!
//! Responses are queued per method and path (optionally narrowed by query
//! parameters) and consumed in order. A deferred reply hands the test a
//! sender, so it decides when, and in which order, responses arrive.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::client::{Transport, TransportRequest, TransportResponse};
use crate::error::{ApiError, ApiResult};

enum Reply {
    Ready(ApiResult<TransportResponse>),
    Deferred(oneshot::Receiver<TransportResponse>),
}

struct Expectation {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    reply: Reply,
}

impl Expectation {
    fn matches(&self, request: &TransportRequest) -> bool {
        if self.method != request.method || !request.url.path().ends_with(&self.path) {
            return false;
        }
        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        self.query.iter().all(|expected| pairs.contains(expected))
    }
}

/// In-memory transport with queued replies and a request log
#[derive(Default)]
pub struct MockTransport {
    expectations: Mutex<Vec<Expectation>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, query: &[(&str, &str)], reply: Reply) {
        let query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.expectations
            .lock()
            .expect("mock expectations lock")
            .push(Expectation {
                method,
                path: path.to_string(),
                query,
                reply,
            });
    }

    /// Queue a JSON response
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond_raw(method, path, TransportResponse::json(status, &body));
    }

    /// Queue a JSON response for requests carrying the given query parameters
    pub fn respond_matching(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        status: u16,
        body: Value,
    ) {
        let reply = Reply::Ready(Ok(TransportResponse::json(status, &body)));
        self.push(method, path, query, reply);
    }

    /// Queue a raw response
    pub fn respond_raw(&self, method: Method, path: &str, response: TransportResponse) {
        self.push(method, path, &[], Reply::Ready(Ok(response)));
    }

    /// Queue a transport failure
    pub fn fail(&self, method: Method, path: &str, error: ApiError) {
        self.push(method, path, &[], Reply::Ready(Err(error)));
    }

    /// Queue a reply that is held back until the returned sender fires
    pub fn defer(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> oneshot::Sender<TransportResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, query, Reply::Deferred(rx));
        tx
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("mock requests lock").clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        self.requests
            .lock()
            .expect("mock requests lock")
            .push(request.clone());

        let reply = {
            let mut expectations = self.expectations.lock().expect("mock expectations lock");
            let position = expectations.iter().position(|e| e.matches(&request));
            position.map(|index| expectations.remove(index).reply)
        };

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(rx)) => rx
                .await
                .map_err(|_| ApiError::Network("deferred reply dropped".to_string())),
            None => Err(ApiError::Network(format!(
                "no scripted reply for {} {}",
                request.method, request.url
            ))),
        }
    }
}
