//! Integration tests for HTTP transport

use bdk_core::retry::{ClassifiedFailure, FailureClassifier, StatusClassifier, TransientCause};
use bdk_transport::{HttpRequest, HttpTransport, HttpTransportConfig, Transport, TransportError};
use rstest::rstest;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_returns_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pod/v2/sessioninfo"))
        .and(header("sessionToken", "abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-trace-id", "t-1")
                .set_body_json(serde_json::json!({"id": 7})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let request = HttpRequest::new("get", format!("{}/pod/v2/sessioninfo", server.uri()))
        .with_header("sessionToken", "abc");
    let response = transport.send_http(request).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.get_header("X-Trace-Id"), Some("t-1"));
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["id"], 7);
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sessionauth/v1/authenticate"))
        .and(body_json(serde_json::json!({"user": "bot"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let request = HttpRequest::new("POST", format!("{}/sessionauth/v1/authenticate", server.uri()))
        .with_json_body(&serde_json::json!({"user": "bot"}))
        .unwrap();

    assert_eq!(transport.send_http(request).await.unwrap().status, 200);
}

#[rstest]
#[case(401)]
#[case(429)]
#[case(500)]
#[tokio::test]
async fn test_error_statuses_are_responses_not_errors(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(HttpRequest::new("GET", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, status);
    assert!(response.is_error());
}

#[tokio::test]
async fn test_transport_performs_a_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(HttpRequest::new("GET", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
}

#[tokio::test]
async fn test_refused_connection_is_classified_as_network() {
    // Bind then drop a listener so the port is known to be closed.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let transport = HttpTransport::new().unwrap();
    let err = transport
        .send_http(HttpRequest::new("GET", format!("http://{addr}/pod")))
        .await
        .unwrap_err();

    assert!(err.is_connection_failure(), "unexpected error: {err}");
    assert_eq!(
        StatusClassifier.classify(&err),
        ClassifiedFailure::Retryable(TransientCause::Network)
    );
}

#[tokio::test]
async fn test_connection_closed_before_response_is_classified_as_network() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepter = tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    let transport = HttpTransport::new().unwrap();
    let err = transport
        .send_http(HttpRequest::new("GET", format!("http://{addr}/pod")))
        .await
        .unwrap_err();
    accepter.abort();

    assert!(err.is_connection_failure(), "unexpected error: {err}");
    assert_eq!(
        StatusClassifier.classify(&err),
        ClassifiedFailure::Retryable(TransientCause::Network)
    );
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = HttpTransport::with_config(HttpTransportConfig {
        timeout: Duration::from_millis(100),
        ..Default::default()
    })
    .unwrap();

    let err = transport
        .send_http(HttpRequest::new("GET", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Timeout));
}

#[tokio::test]
async fn test_unsupported_method() {
    let transport = HttpTransport::new().unwrap();
    let err = transport
        .send_http(HttpRequest::new("NOT A METHOD", "http://localhost"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Config(_)));
}

#[test]
fn test_invalid_client_certificate_is_config_error() {
    let mut pem = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut pem, b"not a certificate").unwrap();

    let result = HttpTransport::with_config(HttpTransportConfig {
        identity_path: Some(pem.path().to_path_buf()),
        ..Default::default()
    });

    assert!(matches!(result, Err(TransportError::Config(_))));
}
