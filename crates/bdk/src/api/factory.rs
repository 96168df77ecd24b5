use super::ApiClient;
use crate::config::BdkConfig;
use crate::error::Result;
use bdk_transport::{HttpTransport, HttpTransportConfig, ProxyConfig, Transport};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Builds [`ApiClient`]s for every service named in a [`BdkConfig`].
///
/// Two transports are created: a regular one, and one presenting the bot
/// certificate for the certificate authentication endpoints. Both share the
/// proxy and trust store settings.
///
/// # Example
///
/// ```rust
/// use bdk::api::ApiClientFactory;
/// use bdk::config::BdkConfig;
///
/// let factory = ApiClientFactory::new(&BdkConfig::with_host("acme.symphony.com")).unwrap();
/// let pod = factory.pod_client().unwrap();
///
/// assert_eq!(pod.base_url(), "https://acme.symphony.com:443/pod");
/// ```
#[derive(Clone, Debug)]
pub struct ApiClientFactory {
    config: BdkConfig,
    transport: Arc<HttpTransport>,
    certificate_transport: Arc<HttpTransport>,
}

impl ApiClientFactory {
    /// Create the transports for `config`.
    ///
    /// # Errors
    ///
    /// Fails if the proxy, trust store or bot certificate cannot be loaded.
    pub fn new(config: &BdkConfig) -> Result<Self> {
        let transport_config = Self::transport_config(config);
        let transport = Arc::new(HttpTransport::with_config(transport_config.clone())?);

        let certificate_transport = match &config.bot.certificate.path {
            Some(path) => Arc::new(HttpTransport::with_config(HttpTransportConfig {
                identity_path: Some(path.clone()),
                ..transport_config
            })?),
            None => transport.clone(),
        };

        Ok(Self {
            config: config.clone(),
            transport,
            certificate_transport,
        })
    }

    /// Transport settings derived from the proxy and SSL sections.
    pub fn transport_config(config: &BdkConfig) -> HttpTransportConfig {
        let proxy = config.proxy.as_ref().map(|proxy| {
            let transport_proxy = ProxyConfig::new(proxy.url());
            match (&proxy.username, &proxy.password) {
                (Some(user), Some(password)) => {
                    transport_proxy.with_credentials(user, password.expose_secret())
                }
                (Some(user), None) => transport_proxy.with_credentials(user, ""),
                _ => transport_proxy,
            }
        });

        HttpTransportConfig {
            proxy,
            trust_store_path: config.ssl.trust_store.path.clone(),
            ..Default::default()
        }
    }

    /// Pod API, `{pod}/pod`.
    pub fn pod_client(&self) -> Result<ApiClient> {
        Ok(self.client(self.config.pod_url()?, "/pod", &self.transport))
    }

    /// Pod login API, `{pod}/login`.
    pub fn login_client(&self) -> Result<ApiClient> {
        Ok(self.client(self.config.pod_url()?, "/login", &self.transport))
    }

    /// Agent API, `{agent}/agent`.
    pub fn agent_client(&self) -> Result<ApiClient> {
        Ok(self.client(self.config.agent_url()?, "/agent", &self.transport))
    }

    /// Session authentication API, `{sessionAuth}/sessionauth`.
    pub fn session_auth_client(&self) -> Result<ApiClient> {
        Ok(self.client(
            self.config.session_auth_url()?,
            "/sessionauth",
            &self.certificate_transport,
        ))
    }

    /// Key manager relay API, `{keyManager}/relay`.
    pub fn relay_client(&self) -> Result<ApiClient> {
        Ok(self.client(self.config.key_manager_url()?, "/relay", &self.transport))
    }

    /// Key manager certificate authentication API, `{keyManager}/keyauth`.
    pub fn key_auth_client(&self) -> Result<ApiClient> {
        Ok(self.client(
            self.config.key_manager_url()?,
            "/keyauth",
            &self.certificate_transport,
        ))
    }

    fn client(&self, base: String, suffix: &str, transport: &Arc<HttpTransport>) -> ApiClient {
        let transport: Arc<dyn Transport> = transport.clone();
        ApiClient::new(format!("{base}{suffix}"), transport)
    }
}
