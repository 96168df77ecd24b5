//! Configuration for the BDK
//!
//! The configuration is usually read from a YAML or JSON file with
//! [`BdkConfigLoader`]. Keys use camelCase, as in:
//!
//! ```yaml
//! host: acme.symphony.com
//! agent:
//!   host: agent.acme.symphony.com
//! bot:
//!   username: bot-user
//!   certificate:
//!     path: /path/to/bot.pem
//! retry:
//!   maxAttempts: 5
//!   initialIntervalMillis: 1000
//! ```
//!
//! Per-service sections (`pod`, `agent`, `keyManager`, `sessionAuth`) fall
//! back to the global `scheme`, `host`, `port` and `context` for every field
//! they leave unset.

mod loader;

pub use loader::BdkConfigLoader;

use crate::error::{Error, Result};
use bdk_core::retry::{
    DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_INTERVAL, DEFAULT_MULTIPLIER,
    RetryConfig,
};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default URL scheme
pub const DEFAULT_SCHEME: &str = "https";

/// Default HTTPS port
pub const DEFAULT_PORT: u16 = 443;

/// The whole BDK configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BdkConfig {
    /// Global URL scheme
    pub scheme: String,

    /// Global host name
    pub host: Option<String>,

    /// Global port
    pub port: u16,

    /// Global context path, e.g. `/prefix`
    pub context: String,

    /// Pod endpoint overrides
    pub pod: ClientConfig,

    /// Agent endpoint overrides
    pub agent: ClientConfig,

    /// Key manager endpoint overrides
    pub key_manager: ClientConfig,

    /// Session authentication endpoint overrides
    pub session_auth: ClientConfig,

    /// Outbound proxy
    pub proxy: Option<ProxyConfig>,

    /// TLS settings
    pub ssl: SslConfig,

    /// Bot service account
    pub bot: BotConfig,

    /// Retry policy applied to API calls
    pub retry: RetrySettings,

    /// Datafeed settings
    pub datafeed: DatafeedConfig,
}

impl Default for BdkConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: None,
            port: DEFAULT_PORT,
            context: String::new(),
            pod: ClientConfig::default(),
            agent: ClientConfig::default(),
            key_manager: ClientConfig::default(),
            session_auth: ClientConfig::default(),
            proxy: None,
            ssl: SslConfig::default(),
            bot: BotConfig::default(),
            retry: RetrySettings::default(),
            datafeed: DatafeedConfig::default(),
        }
    }
}

impl BdkConfig {
    /// Configuration pointing every service at `host`.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Default::default()
        }
    }

    /// Whether a bot service account is configured.
    pub fn is_bot_configured(&self) -> bool {
        self.bot.username.is_some()
    }

    /// Base URL of the pod, without the API suffix.
    pub fn pod_url(&self) -> Result<String> {
        self.server_url(&self.pod)
    }

    /// Base URL of the agent.
    pub fn agent_url(&self) -> Result<String> {
        self.server_url(&self.agent)
    }

    /// Base URL of the key manager.
    pub fn key_manager_url(&self) -> Result<String> {
        self.server_url(&self.key_manager)
    }

    /// Base URL of the session authentication service.
    pub fn session_auth_url(&self) -> Result<String> {
        self.server_url(&self.session_auth)
    }

    /// Compose `scheme://host:port{context}` for a service, filling unset
    /// fields from the global settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if neither the service nor the global
    /// section sets a host, or if the result is not a valid URL.
    pub fn server_url(&self, client: &ClientConfig) -> Result<String> {
        let scheme = client.scheme.as_deref().unwrap_or(&self.scheme);
        let host = client
            .host
            .as_deref()
            .or(self.host.as_deref())
            .ok_or_else(|| Error::Config("no host configured".to_string()))?;
        let port = client.port.unwrap_or(self.port);
        let context = normalize_context(client.context.as_deref().unwrap_or(&self.context));

        let composed = format!("{scheme}://{host}:{port}{context}");
        url::Url::parse(&composed)
            .map_err(|e| Error::Config(format!("invalid server URL {composed}: {e}")))?;
        Ok(composed)
    }

    /// Apply environment variable overrides.
    ///
    /// This will look for:
    /// - `BDK_HOST` for the global host
    /// - `BDK_PORT` for the global port
    /// - `BDK_BOT_USERNAME` for the bot service account
    /// - `BDK_RETRY_MAX_ATTEMPTS` for the API retry budget
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a numeric variable does not parse.
    pub fn apply_env(mut self) -> Result<Self> {
        use std::env;

        if let Ok(host) = env::var("BDK_HOST") {
            self.host = Some(host);
        }

        if let Ok(port) = env::var("BDK_PORT") {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("BDK_PORT is not a valid port: {port}")))?;
        }

        if let Ok(username) = env::var("BDK_BOT_USERNAME") {
            self.bot.username = Some(username);
        }

        if let Ok(attempts) = env::var("BDK_RETRY_MAX_ATTEMPTS") {
            self.retry.max_attempts = attempts.parse().map_err(|_| {
                Error::Config(format!(
                    "BDK_RETRY_MAX_ATTEMPTS is not a valid number: {attempts}"
                ))
            })?;
        }

        Ok(self)
    }
}

fn normalize_context(context: &str) -> String {
    let trimmed = context.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Per-service endpoint settings. Unset fields inherit the global value.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// URL scheme
    pub scheme: Option<String>,
    /// Host name
    pub host: Option<String>,
    /// Port
    pub port: Option<u16>,
    /// Context path
    pub context: Option<String>,
}

/// Outbound proxy settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Proxy host
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Basic authentication user
    #[serde(default)]
    pub username: Option<String>,
    /// Basic authentication password
    #[serde(default)]
    pub password: Option<SecretString>,
}

impl ProxyConfig {
    /// Proxy without credentials.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Proxy URL as understood by the transport.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// TLS settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SslConfig {
    /// Additional trusted certificates
    pub trust_store: TrustStoreConfig,
}

/// Location of a PEM trust store.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrustStoreConfig {
    /// Path to the PEM file
    pub path: Option<PathBuf>,
}

/// Bot service account.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BotConfig {
    /// Service account user name
    pub username: Option<String>,
    /// Client certificate used for authentication
    pub certificate: CertificateConfig,
}

/// Location of a PEM client certificate and private key.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CertificateConfig {
    /// Path to the PEM file
    pub path: Option<PathBuf>,
}

/// Datafeed settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DatafeedConfig {
    /// Datafeed API version
    pub version: Option<String>,
    /// Retry policy for datafeed reads
    pub retry: RetrySettings,
}

/// Serialized form of a retry policy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrySettings {
    /// Total attempts, first call included
    pub max_attempts: u32,
    /// Growth factor between delays
    pub multiplier: f64,
    /// First delay in milliseconds
    pub initial_interval_millis: u64,
    /// Delay cap in milliseconds
    pub max_interval_millis: u64,
    /// Random spread applied to each delay, `0.0..=1.0`
    pub jitter: f64,
    /// Overall budget in milliseconds
    pub deadline_millis: Option<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            multiplier: DEFAULT_MULTIPLIER,
            initial_interval_millis: DEFAULT_INITIAL_INTERVAL.as_millis() as u64,
            max_interval_millis: DEFAULT_MAX_INTERVAL.as_millis() as u64,
            jitter: 0.0,
            deadline_millis: None,
        }
    }
}

impl RetrySettings {
    /// Validate and convert into a [`RetryConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRetryConfig`] for out-of-range values.
    pub fn to_retry_config(&self) -> Result<RetryConfig> {
        let mut builder = RetryConfig::builder()
            .max_attempts(self.max_attempts)
            .multiplier(self.multiplier)
            .initial_interval(Duration::from_millis(self.initial_interval_millis))
            .max_interval(Duration::from_millis(self.max_interval_millis))
            .jitter(self.jitter);
        if let Some(deadline) = self.deadline_millis {
            builder = builder.deadline(Duration::from_millis(deadline));
        }
        Ok(builder.build()?)
    }
}
