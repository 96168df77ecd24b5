use super::{AuthTokens, BotAuthenticator};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bdk_core::AuthError;
use bdk_core::retry::{CredentialRefresher, Token};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

/// The bot's authentication session.
///
/// Tokens are fetched on first use and replaced by [`AuthSession::refresh`].
/// The session is the credential refresher of the SDK's retry invoker, so an
/// expired session token is renewed before the failed call is retried.
pub struct AuthSession {
    authenticator: Arc<dyn BotAuthenticator>,
    tokens: RwLock<Option<AuthTokens>>,
    authentications: AtomicU32,
}

impl AuthSession {
    /// Session backed by `authenticator`. No call is made until a token is
    /// requested.
    pub fn new(authenticator: Arc<dyn BotAuthenticator>) -> Self {
        Self {
            authenticator,
            tokens: RwLock::new(None),
            authentications: AtomicU32::new(0),
        }
    }

    /// Current session token, authenticating first if needed.
    pub async fn session_token(&self) -> Result<Token> {
        Ok(self.tokens().await?.session_token)
    }

    /// Current key manager token, authenticating first if needed.
    pub async fn key_manager_token(&self) -> Result<Token> {
        Ok(self.tokens().await?.key_manager_token)
    }

    /// Re-authenticate and replace both tokens.
    ///
    /// On failure the previous tokens are kept.
    pub async fn refresh(&self) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        *tokens = Some(self.authenticate().await?);
        Ok(())
    }

    /// Number of successful authentications so far.
    pub fn authentications(&self) -> u32 {
        self.authentications.load(Ordering::SeqCst)
    }

    async fn tokens(&self) -> Result<AuthTokens> {
        if let Some(tokens) = self.tokens.read().await.as_ref() {
            return Ok(tokens.clone());
        }

        let mut guard = self.tokens.write().await;
        // Another task may have authenticated while we waited for the lock.
        if let Some(tokens) = guard.as_ref() {
            return Ok(tokens.clone());
        }
        let tokens = self.authenticate().await?;
        *guard = Some(tokens.clone());
        Ok(tokens)
    }

    async fn authenticate(&self) -> Result<AuthTokens> {
        let tokens = self.authenticator.authenticate_bot().await?;
        let count = self.authentications.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(authentications = count, "bot session authenticated");
        Ok(tokens)
    }
}

#[async_trait]
impl CredentialRefresher for AuthSession {
    async fn refresh_credentials(&self) -> std::result::Result<Token, AuthError> {
        tracing::info!("session expired, re-authenticating bot");
        self.refresh().await.map_err(|err| match err {
            Error::AuthUnauthorized { message, .. } => AuthError::Unauthorized(message),
            other => AuthError::refresh(other),
        })?;
        self.session_token().await.map_err(AuthError::refresh)
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("authentications", &self.authentications())
            .finish_non_exhaustive()
    }
}
