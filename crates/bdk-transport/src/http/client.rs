//! HTTP transport client implementation
//!
//! Implements the Transport trait on top of reqwest. Retries are not handled
//! here; callers wrap requests in a `RetryableInvoker` so that status codes
//! can be classified.

use crate::error::{Result, TransportError};
use crate::traits::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// HTTP transport implementation
///
/// Handles HTTP requests with:
/// - Connection pooling
/// - Optional proxy with basic authentication
/// - Custom trust store and client certificate
/// - Timeout handling
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<ReqwestClient>,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new HTTP transport with custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Config`] when the proxy URL or the TLS
    /// material is invalid, and [`TransportError::Io`] when a certificate
    /// file cannot be read.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        if let Some(path) = &config.trust_store_path {
            let pem = std::fs::read(path)?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                TransportError::Config(format!("invalid trust store {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(path) = &config.identity_path {
            let pem = std::fs::read(path)?;
            let identity = reqwest::Identity::from_pem(&pem).map_err(|e| {
                TransportError::Config(format!(
                    "invalid client certificate {}: {}",
                    path.display(),
                    e
                ))
            })?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            timeout: config.timeout,
        })
    }

    /// Get a reference to the underlying reqwest client
    pub fn reqwest_client(&self) -> Arc<ReqwestClient> {
        self.client.clone()
    }

    /// Request timeout applied to every call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| {
                TransportError::Config(format!("Unsupported HTTP method: {}", request.method))
            })?;

        tracing::debug!(method = %method, url = %request.url, "sending request");

        let mut req = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req.send().await.map_err(TransportError::from_send)?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response.bytes().await?.to_vec();

        tracing::debug!(status, bytes = body.len(), url = %request.url, "received response");

        Ok(HttpResponse::new(status, headers, body))
    }
}

/// Outbound proxy settings
#[derive(Clone)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.corp:3128`
    pub url: String,

    /// Basic authentication user name
    pub username: Option<String>,

    /// Basic authentication password
    pub password: Option<SecretString>,
}

impl ProxyConfig {
    /// Proxy without credentials
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Attach basic authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(SecretString::new(password.into().into_boxed_str()));
        self
    }

    fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(&self.url)
            .map_err(|e| TransportError::Config(format!("invalid proxy {}: {}", self.url, e)))?;
        Ok(match (&self.username, &self.password) {
            (Some(user), Some(password)) => proxy.basic_auth(user, password.expose_secret()),
            (Some(user), None) => proxy.basic_auth(user, ""),
            _ => proxy,
        })
    }
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Optional outbound proxy
    pub proxy: Option<ProxyConfig>,

    /// PEM file with additional trusted root certificates
    pub trust_store_path: Option<PathBuf>,

    /// PEM file holding the client certificate and its private key
    pub identity_path: Option<PathBuf>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            proxy: None,
            trust_store_path: None,
            identity_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new().expect("Failed to create transport");
        assert_eq!(transport.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_http_transport_with_config() {
        let config = HttpTransportConfig {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 5,
            ..Default::default()
        };

        let transport = HttpTransport::with_config(config).expect("Failed to create transport");
        assert_eq!(transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_proxy_with_credentials() {
        let config = HttpTransportConfig {
            proxy: Some(ProxyConfig::new("http://proxy.local:3128").with_credentials("bot", "pw")),
            ..Default::default()
        };

        assert!(HttpTransport::with_config(config).is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let config = HttpTransportConfig {
            proxy: Some(ProxyConfig::new("not a url")),
            ..Default::default()
        };

        assert!(matches!(
            HttpTransport::with_config(config),
            Err(TransportError::Config(_))
        ));
    }

    #[test]
    fn test_missing_trust_store_is_io_error() {
        let config = HttpTransportConfig {
            trust_store_path: Some(PathBuf::from("/definitely/not/here.pem")),
            ..Default::default()
        };

        assert!(matches!(
            HttpTransport::with_config(config),
            Err(TransportError::Io(_))
        ));
    }

    #[test]
    fn test_proxy_debug_hides_password() {
        let proxy = ProxyConfig::new("http://proxy.local").with_credentials("bot", "hunter2");
        assert!(!format!("{proxy:?}").contains("hunter2"));
    }
}
