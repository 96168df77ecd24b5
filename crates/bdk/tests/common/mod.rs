//! Shared fixtures for the wiremock integration tests.

#![allow(dead_code)]

use bdk::config::{BdkConfig, RetrySettings};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_AUTH_PATH: &str = "/sessionauth/v1/authenticate";
pub const KEY_AUTH_PATH: &str = "/keyauth/v1/authenticate";
pub const SESSION_INFO_PATH: &str = "/pod/v2/sessioninfo";

/// Configuration pointing every service at `server`, with short retry delays.
pub fn config_for(server: &MockServer) -> BdkConfig {
    let address = server.address();
    let mut config = BdkConfig::default();
    config.scheme = "http".to_string();
    config.host = Some(address.ip().to_string());
    config.port = address.port();
    config.bot.username = Some("bot-user".to_string());
    config.retry = RetrySettings {
        max_attempts: 3,
        initial_interval_millis: 10,
        max_interval_millis: 50,
        ..Default::default()
    };
    config
}

pub fn token_body(name: &str, token: &str) -> serde_json::Value {
    json!({ "name": name, "token": token })
}

/// Key manager authentication always succeeds.
pub async fn mount_key_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(KEY_AUTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("keyManagerToken", "km-token")))
        .mount(server)
        .await;
}

/// Session authentication returning `token` for the next `times` calls.
pub async fn mount_session_auth(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(SESSION_AUTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("sessionToken", token)))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

pub fn session_info_body() -> serde_json::Value {
    json!({
        "id": 7696581394433_u64,
        "displayName": "Bot",
        "username": "bot-user",
        "emailAddress": "bot@acme.com"
    })
}
