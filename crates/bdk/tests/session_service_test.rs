//! End-to-end retry and session refresh behaviour of the SDK facade.

mod common;

use assert_matches::assert_matches;
use bdk::retry::RetryOverrides;
use bdk::services::UserSession;
use bdk::{Bdk, Error};
use common::*;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn session_info_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == SESSION_INFO_PATH)
        .count()
}

#[tokio::test]
async fn test_get_session() {
    let server = MockServer::start().await;
    mount_session_auth(&server, "token-1", 1).await;
    mount_key_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .and(header("sessionToken", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_info_body()))
        .expect(1)
        .mount(&server)
        .await;

    let bdk = Bdk::new(config_for(&server)).unwrap();
    let session = bdk.sessions().get_session().await.unwrap();

    assert_eq!(
        session,
        UserSession {
            id: 7696581394433,
            display_name: "Bot".to_string(),
            username: "bot-user".to_string(),
            email_address: Some("bot@acme.com".to_string()),
        }
    );
    assert_eq!(bdk.bot_session().authentications(), 1);
}

#[tokio::test]
async fn test_expired_session_is_refreshed() {
    let server = MockServer::start().await;
    mount_session_auth(&server, "expired", 1).await;
    mount_session_auth(&server, "fresh", 1).await;
    mount_key_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .and(header("sessionToken", "expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .and(header("sessionToken", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_info_body()))
        .expect(1)
        .mount(&server)
        .await;

    let bdk = Bdk::new(config_for(&server)).unwrap();
    let session = bdk.sessions().get_session().await.unwrap();

    assert_eq!(session.username, "bot-user");
    assert_eq!(bdk.bot_session().authentications(), 2);
}

#[tokio::test]
async fn test_failed_refresh_is_unauthorized() {
    let server = MockServer::start().await;
    mount_session_auth(&server, "expired", 1).await;
    mount_key_auth(&server).await;
    // Re-authentication is rejected
    Mock::given(method("POST"))
        .and(path(SESSION_AUTH_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let bdk = Bdk::new(config_for(&server)).unwrap();
    let err = bdk.sessions().get_session().await.unwrap_err();

    assert!(err.is_unauthorized(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;
    mount_session_auth(&server, "token-1", 1).await;
    mount_key_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_info_body()))
        .mount(&server)
        .await;

    let bdk = Bdk::new(config_for(&server)).unwrap();
    bdk.sessions().get_session().await.unwrap();

    assert_eq!(session_info_requests(&server).await, 3);
    assert_eq!(bdk.bot_session().authentications(), 1);
}

#[tokio::test]
async fn test_fatal_status_is_not_retried() {
    let server = MockServer::start().await;
    mount_session_auth(&server, "token-1", 1).await;
    mount_key_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let bdk = Bdk::new(config_for(&server)).unwrap();
    let err = bdk.sessions().get_session().await.unwrap_err();

    assert_matches!(err, Error::Api { status: 403, .. });
}

#[tokio::test]
async fn test_retry_budget_is_exhausted() {
    let server = MockServer::start().await;
    mount_session_auth(&server, "token-1", 1).await;
    mount_key_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let bdk = Bdk::new(config_for(&server)).unwrap();
    let err = bdk.sessions().get_session().await.unwrap_err();

    assert_matches!(err, Error::RetriesExhausted { attempts: 3, .. });
    assert_eq!(session_info_requests(&server).await, 3);
}

#[tokio::test]
async fn test_per_call_overrides() {
    let server = MockServer::start().await;
    mount_session_auth(&server, "token-1", 1).await;
    mount_key_auth(&server).await;
    Mock::given(method("GET"))
        .and(path(SESSION_INFO_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let bdk = Bdk::new(config_for(&server)).unwrap();
    let err = bdk
        .sessions()
        .get_session_with(&RetryOverrides::none().max_attempts(1))
        .await
        .unwrap_err();

    assert_matches!(err, Error::RetriesExhausted { attempts: 1, .. });
    assert_eq!(session_info_requests(&server).await, 1);

    // The facade policy is unchanged for the next call
    assert_eq!(bdk.invoker().config().max_attempts(), 3);
}

#[tokio::test]
async fn test_network_errors_are_retried() {
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.port = port;

    let bdk = Bdk::new(config).unwrap();
    let err = bdk.sessions().get_session().await.unwrap_err();

    // Authentication gives up after its own attempt budget
    assert_matches!(
        err,
        Error::RetriesExhausted { attempts: 3, ref source } if matches!(**source, Error::Transport(_))
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}
