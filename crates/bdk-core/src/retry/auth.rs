//! Credential refresh on authentication expiry.

use crate::error::AuthError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

/// A freshly issued session credential.
#[derive(Clone)]
pub struct Token(SecretString);

impl Token {
    /// Wrap a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::new(value.into().into_boxed_str()))
    }

    /// Reveal the raw token value.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

impl From<SecretString> for Token {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

/// Obtains new credentials after the previous ones were rejected.
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    /// Re-authenticate and return the new session token.
    async fn refresh_credentials(&self) -> Result<Token, AuthError>;
}

/// Phase of an [`AuthRefreshGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// No refresh in progress.
    Idle,
    /// Waiting on the refresher.
    Refreshing,
    /// A refresh failed; the invocation must terminate.
    RefreshFailed,
}

/// Handles `AuthExpired` failures for one invocation.
///
/// `Idle → Refreshing → { Idle (refreshed), RefreshFailed (terminal) }`.
/// A failed refresh is never retried; the invoker turns it into
/// [`RetryError::AuthUnauthorized`](crate::RetryError::AuthUnauthorized).
pub struct AuthRefreshGuard {
    refresher: Option<Arc<dyn CredentialRefresher>>,
    state: GuardState,
    refreshes: u32,
}

impl AuthRefreshGuard {
    /// Create a guard backed by an optional refresher. Without one every
    /// expiry is terminal.
    pub fn new(refresher: Option<Arc<dyn CredentialRefresher>>) -> Self {
        Self {
            refresher,
            state: GuardState::Idle,
            refreshes: 0,
        }
    }

    /// Current phase.
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Whether [`on_auth_expired`](Self::on_auth_expired) would contact a
    /// refresher.
    pub fn can_refresh(&self) -> bool {
        self.refresher.is_some() && self.state != GuardState::RefreshFailed
    }

    /// Number of successful refreshes performed.
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    /// Refresh credentials after an expiry was detected.
    ///
    /// # Errors
    ///
    /// Returns the refresher's error (or [`AuthError::MissingRefresher`]) and
    /// moves to [`GuardState::RefreshFailed`]. Once failed, every later call
    /// fails immediately without contacting the refresher.
    pub async fn on_auth_expired(&mut self) -> Result<Token, AuthError> {
        if self.state == GuardState::RefreshFailed {
            return Err(AuthError::Unauthorized(
                "a previous credential refresh already failed".to_string(),
            ));
        }
        let Some(refresher) = self.refresher.as_ref() else {
            self.state = GuardState::RefreshFailed;
            return Err(AuthError::MissingRefresher);
        };

        self.state = GuardState::Refreshing;
        match refresher.refresh_credentials().await {
            Ok(token) => {
                self.refreshes += 1;
                self.state = GuardState::Idle;
                Ok(token)
            }
            Err(err) => {
                self.state = GuardState::RefreshFailed;
                Err(err)
            }
        }
    }
}

impl fmt::Debug for AuthRefreshGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRefreshGuard")
            .field("has_refresher", &self.refresher.is_some())
            .field("state", &self.state)
            .field("refreshes", &self.refreshes)
            .finish()
    }
}
