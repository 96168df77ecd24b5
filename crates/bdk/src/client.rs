//! Entry point of the SDK

use std::sync::{Arc, OnceLock};

use bdk_core::retry::{RetryConfig, RetryableInvoker};

use crate::{
    api::{ApiClient, ApiClientFactory},
    auth::{AuthSession, BotAuthenticator, CertificateBotAuthenticator},
    config::BdkConfig,
    error::{Error, Result},
    services::SessionService,
};

/// Main entry point for interacting with the platform.
///
/// Wires the API client factory, the bot session and one
/// [`RetryableInvoker`] configured from `config.retry`. The invoker uses the
/// bot session as credential refresher, so every service retries transient
/// errors and renews an expired session token.
///
/// `Bdk` is cheap to clone; clones share the same session.
///
/// # Example
///
/// ```rust,no_run
/// use bdk::{Bdk, BdkConfigLoader};
///
/// # async fn example() -> Result<(), bdk::Error> {
/// let config = BdkConfigLoader::load_from_symphony_dir("config.yaml")?;
/// let bdk = Bdk::new(config)?;
///
/// let session = bdk.sessions().get_session().await?;
/// println!("running as {}", session.display_name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Bdk {
    inner: Arc<BdkInner>,
}

struct BdkInner {
    config: BdkConfig,
    factory: ApiClientFactory,
    pod: ApiClient,
    bot_session: Arc<AuthSession>,
    invoker: RetryableInvoker,

    // Lazy-initialized services
    sessions: OnceLock<SessionService>,
}

impl Bdk {
    /// Create the SDK for a bot service account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no bot user name is configured
    /// - a retry section is invalid
    /// - the transports cannot be built (proxy, trust store, certificate)
    /// - a service host is missing
    pub fn new(config: BdkConfig) -> Result<Self> {
        if !config.is_bot_configured() {
            return Err(Error::Config("bot.username is not configured".to_string()));
        }

        let factory = ApiClientFactory::new(&config)?;
        let retry = config.retry.to_retry_config()?;
        config.datafeed.retry.to_retry_config()?;

        let authenticator: Arc<dyn BotAuthenticator> =
            Arc::new(CertificateBotAuthenticator::new(&factory, retry.clone())?);
        Self::with_authenticator(config, factory, retry, authenticator)
    }

    /// Create the SDK with a custom authenticator.
    pub fn with_authenticator(
        config: BdkConfig,
        factory: ApiClientFactory,
        retry: RetryConfig,
        authenticator: Arc<dyn BotAuthenticator>,
    ) -> Result<Self> {
        let pod = factory.pod_client()?;
        let bot_session = Arc::new(AuthSession::new(authenticator));
        let invoker = RetryableInvoker::new(retry).with_refresher(bot_session.clone());

        Ok(Self {
            inner: Arc::new(BdkInner {
                config,
                factory,
                pod,
                bot_session,
                invoker,
                sessions: OnceLock::new(),
            }),
        })
    }

    /// The configuration this instance was built from.
    pub fn config(&self) -> &BdkConfig {
        &self.inner.config
    }

    /// Factory for low-level API clients.
    pub fn api_clients(&self) -> &ApiClientFactory {
        &self.inner.factory
    }

    /// The bot's authentication session.
    pub fn bot_session(&self) -> &Arc<AuthSession> {
        &self.inner.bot_session
    }

    /// Invoker applying the API retry policy and refreshing the bot session.
    pub fn invoker(&self) -> &RetryableInvoker {
        &self.inner.invoker
    }

    /// Retry policy for datafeed reads, from `datafeed.retry`.
    pub fn datafeed_retry_config(&self) -> Result<RetryConfig> {
        self.inner.config.datafeed.retry.to_retry_config()
    }

    /// Session information service.
    pub fn sessions(&self) -> &SessionService {
        self.inner.sessions.get_or_init(|| {
            SessionService::new(
                self.inner.pod.clone(),
                self.inner.bot_session.clone(),
                self.inner.invoker.clone(),
            )
        })
    }
}

impl std::fmt::Debug for Bdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdk")
            .field("pod", &self.inner.pod)
            .field("invoker", &self.inner.invoker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrySettings;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn bot_config() -> BdkConfig {
        let mut config = BdkConfig::with_host("acme.symphony.com");
        config.bot.username = Some("bot-user".to_string());
        config
    }

    #[test]
    fn test_requires_bot() {
        let err = Bdk::new(BdkConfig::with_host("acme.symphony.com")).unwrap_err();
        assert_matches!(err, Error::Config(_));
    }

    #[test]
    fn test_invalid_retry_section() {
        let mut config = bot_config();
        config.retry.max_attempts = 0;

        assert_matches!(Bdk::new(config), Err(Error::InvalidRetryConfig(_)));
    }

    #[test]
    fn test_wiring() {
        let mut config = bot_config();
        config.retry.max_attempts = 3;
        config.datafeed.retry = RetrySettings {
            max_attempts: 50,
            ..Default::default()
        };

        let bdk = Bdk::new(config).unwrap();

        assert_eq!(bdk.invoker().config().max_attempts(), 3);
        assert!(bdk.invoker().has_refresher());
        assert_eq!(bdk.datafeed_retry_config().unwrap().max_attempts(), 50);
        assert_eq!(
            bdk.datafeed_retry_config().unwrap().initial_interval(),
            Duration::from_millis(500)
        );
        assert_eq!(
            bdk.api_clients().pod_client().unwrap().base_url(),
            "https://acme.symphony.com:443/pod"
        );
        // No authentication before the first call
        assert_eq!(bdk.bot_session().authentications(), 0);
        assert!(std::ptr::eq(bdk.sessions(), bdk.sessions()));
    }
}
