use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthSession;
use crate::error::Result;
use bdk_core::retry::{InvokeOptions, RetryOverrides, RetryableInvoker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Information about the user owning a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// User id
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// User name
    #[serde(default)]
    pub username: String,
    /// E-mail address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Session information endpoints of the pod.
///
/// Every call runs through the SDK's retry invoker: transient failures are
/// retried with backoff and an expired session token is refreshed once per
/// 401 before the next attempt.
#[derive(Debug, Clone)]
pub struct SessionService {
    pod: ApiClient,
    session: Arc<AuthSession>,
    invoker: RetryableInvoker,
}

impl SessionService {
    /// Service calling `pod` with the tokens of `session`.
    pub fn new(pod: ApiClient, session: Arc<AuthSession>, invoker: RetryableInvoker) -> Self {
        Self {
            pod,
            session,
            invoker,
        }
    }

    /// Session of the bot, `GET /pod/v2/sessioninfo`.
    pub async fn get_session(&self) -> Result<UserSession> {
        self.get_session_with(&RetryOverrides::none()).await
    }

    /// Like [`SessionService::get_session`] with per-call retry overrides.
    pub async fn get_session_with(&self, overrides: &RetryOverrides) -> Result<UserSession> {
        let options = InvokeOptions::new().overrides(overrides.clone());
        Ok(self
            .invoker
            .invoke_with(&options, || self.fetch_session())
            .await?)
    }

    async fn fetch_session(&self) -> Result<UserSession> {
        let token = self.session.session_token().await?;
        self.pod
            .execute_json(ApiRequest::get("/v2/sessioninfo").header("sessionToken", token.expose()))
            .await
    }
}
