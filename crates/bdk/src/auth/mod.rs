//! Bot authentication
//!
//! A bot holds two tokens: a session token for pod and agent calls and a
//! key manager token for encrypted payloads. [`AuthSession`] fetches them
//! lazily through a [`BotAuthenticator`] and re-authenticates when the retry
//! layer reports an expired session.

mod authenticator;
mod session;

pub use authenticator::{BotAuthenticator, CertificateBotAuthenticator};
pub use session::AuthSession;

use bdk_core::retry::Token;

/// Tokens obtained by one successful authentication.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    /// Pod session token, sent as the `sessionToken` header
    pub session_token: Token,
    /// Key manager token, sent as the `keyManagerToken` header
    pub key_manager_token: Token,
}
