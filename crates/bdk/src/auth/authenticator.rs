use super::AuthTokens;
use crate::api::{ApiClient, ApiClientFactory, ApiRequest};
use crate::error::Result;
use async_trait::async_trait;
use bdk_core::retry::{RetryConfig, RetryableInvoker, Token};
use serde::Deserialize;

/// Authenticates the bot service account.
#[async_trait]
pub trait BotAuthenticator: Send + Sync {
    /// Obtain a fresh pair of tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthUnauthorized`](crate::Error::AuthUnauthorized)
    /// when the credentials are rejected.
    async fn authenticate_bot(&self) -> Result<AuthTokens>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[allow(dead_code)]
    name: Option<String>,
    token: String,
}

/// Certificate (mutual TLS) authentication.
///
/// Both calls are retried on network and server errors. A 401 is never
/// retried: the invoker has no refresher, so it ends the login with the
/// "not authorized" error.
#[derive(Debug, Clone)]
pub struct CertificateBotAuthenticator {
    session_auth: ApiClient,
    key_auth: ApiClient,
    invoker: RetryableInvoker,
}

impl CertificateBotAuthenticator {
    /// Authenticator using the session auth and key auth clients of `factory`.
    pub fn new(factory: &ApiClientFactory, retry: RetryConfig) -> Result<Self> {
        Ok(Self {
            session_auth: factory.session_auth_client()?,
            key_auth: factory.key_auth_client()?,
            invoker: RetryableInvoker::new(retry),
        })
    }

    async fn authenticate(&self, client: &ApiClient) -> Result<Token> {
        let response: TokenResponse = self
            .invoker
            .invoke(|| client.execute_json(ApiRequest::post("/v1/authenticate")))
            .await?;
        Ok(Token::new(response.token))
    }
}

#[async_trait]
impl BotAuthenticator for CertificateBotAuthenticator {
    async fn authenticate_bot(&self) -> Result<AuthTokens> {
        let session_token = self.authenticate(&self.session_auth).await?;
        let key_manager_token = self.authenticate(&self.key_auth).await?;
        tracing::info!("bot authenticated");

        Ok(AuthTokens {
            session_token,
            key_manager_token,
        })
    }
}
