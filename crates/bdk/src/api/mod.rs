//! Low-level API clients
//!
//! An [`ApiClient`] is bound to one service base URL (pod, agent, key
//! manager or session authentication). [`ApiClientFactory`] builds them from
//! a [`BdkConfig`](crate::config::BdkConfig).

mod factory;

pub use factory::ApiClientFactory;

use crate::error::{Error, Result};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};
use bdk_transport::{HttpRequest, HttpResponse, Transport};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("bdk-rust/", env!("CARGO_PKG_VERSION"));

/// A request relative to an [`ApiClient`] base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Request with an arbitrary method.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    /// `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Serialize `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `body` cannot be serialized.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Request path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Client for one service.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Client sending requests under `base_url` through `transport`.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request once.
    ///
    /// # Errors
    ///
    /// - [`Error::Api`] for any non-2xx status
    /// - [`Error::Transport`] when no response was received
    pub async fn execute(&self, request: ApiRequest) -> Result<HttpResponse> {
        let metadata = RequestMetadata::new(&request.method, &request.path)
            .with_body_size(request.body.as_ref().map_or(0, Vec::len));
        metadata.log_request();

        let mut http = HttpRequest::new(request.method, self.url(&request.path))
            .with_header("User-Agent", USER_AGENT)
            .with_header("Accept", "application/json");
        for (key, value) in request.headers {
            http = http.with_header(key, value);
        }
        if let Some(body) = request.body {
            http = http.with_body(body);
        }

        let timer = RequestTimer::start();
        let response = self.transport.send_http(http).await.inspect_err(|err| {
            ResponseMetadata::failed(timer.elapsed()).log_error(&metadata, &err.to_string());
        })?;

        let outcome = ResponseMetadata::new(response.status, timer.elapsed())
            .with_body_size(response.body.len());
        if response.is_success() {
            outcome.log_success(&metadata);
            Ok(response)
        } else {
            let err = Error::from_response(response.status, &response.text());
            outcome.log_error(&metadata, &err.to_string());
            Err(err)
        }
    }

    /// Send a request once and parse a JSON response.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use bdk_transport::TransportError;
    use std::sync::Mutex;

    /// Transport returning a canned response and recording requests.
    struct CannedTransport {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send_http(&self, request: HttpRequest) -> bdk_transport::Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse::new(
                self.status,
                HashMap::new(),
                self.body.as_bytes().to_vec(),
            ))
        }
    }

    struct DownTransport;

    #[async_trait]
    impl Transport for DownTransport {
        async fn send_http(&self, _request: HttpRequest) -> bdk_transport::Result<HttpResponse> {
            Err(TransportError::Connection("connection refused".into()))
        }
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://acme.symphony.com:443/pod/", Arc::new(DownTransport));
        assert_eq!(client.base_url(), "https://acme.symphony.com:443/pod");
        assert_eq!(
            client.url("/v2/sessioninfo"),
            "https://acme.symphony.com:443/pod/v2/sessioninfo"
        );
        assert_eq!(
            client.url("v2/sessioninfo"),
            "https://acme.symphony.com:443/pod/v2/sessioninfo"
        );
    }

    #[tokio::test]
    async fn test_execute_sends_default_headers() {
        let transport = CannedTransport::new(200, r#"{"ok":true}"#);
        let client = ApiClient::new("https://pod.local/pod", transport.clone());

        let body: serde_json::Value = client
            .execute_json(ApiRequest::get("/v1/ping").header("sessionToken", "abc"))
            .await
            .unwrap();

        assert_eq!(body["ok"], true);
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "https://pod.local/pod/v1/ping");
        assert_eq!(seen[0].headers.get("User-Agent").map(String::as_str), Some(USER_AGENT));
        assert_eq!(seen[0].headers.get("sessionToken").map(String::as_str), Some("abc"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let client = ApiClient::new("https://pod.local", CannedTransport::new(429, "slow down"));

        let err = client.execute(ApiRequest::get("/x")).await.unwrap_err();

        assert_matches!(err, Error::Api { status: 429, ref message } if message == "slow down");
    }

    #[tokio::test]
    async fn test_transport_failure_is_propagated() {
        let client = ApiClient::new("https://pod.local", Arc::new(DownTransport));

        let err = client.execute(ApiRequest::get("/x")).await.unwrap_err();

        assert_matches!(err, Error::Transport(TransportError::Connection(_)));
    }

    #[tokio::test]
    async fn test_bad_json_is_serialization_error() {
        let client = ApiClient::new("https://pod.local", CannedTransport::new(200, "<html>"));

        let err = client
            .execute_json::<serde_json::Value>(ApiRequest::get("/x"))
            .await
            .unwrap_err();

        assert_matches!(err, Error::Serialization(_));
    }
}
