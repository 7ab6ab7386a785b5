// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP route tests for the key exchange node
//!
//! These tests verify that:
//! - /public-key stores the client key and returns the node key
//! - /encrypted-message replies with the prefixed message, re-encrypted
//! - Sending a message before any exchange is a 409
//! - Malformed keys, JSON and envelopes are 400s
//! - The x-session-id header keeps clients apart
//! - New x-session-id values cannot grow the session map past its cap

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use salted_exchange_node::{
    api::{create_app, AppState, HealthResponse, PublicKeyMessage, SESSION_HEADER},
    crypto::{derive_shared_secret, salted, CipherOptions, PaddingMode, PeerPublicKey},
    SecureChannel, ServerKeyPair, SessionLimits,
};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

/// Helper: fresh router with a random node key
fn setup_app() -> Router {
    let keypair = Arc::new(ServerKeyPair::generate().unwrap());
    let channel = SecureChannel::new(keypair, CipherOptions::default());
    create_app(Arc::new(AppState::new(channel, "hello ")))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn public_key_request(session: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/public-key")
        .header("content-type", "application/json");
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    builder.body(Body::from(body)).unwrap()
}

fn message_request(session: Option<&str>, envelope: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/encrypted-message")
        .header("content-type", "text/plain");
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    builder.body(Body::from(envelope)).unwrap()
}

/// Helper: run the exchange and return the client-side password
async fn exchange(app: &Router, client: &ServerKeyPair, session: Option<&str>) -> String {
    let body = serde_json::to_string(&PublicKeyMessage {
        public_key: client.public_key_hex(),
    })
    .unwrap();

    let response = app
        .clone()
        .oneshot(public_key_request(session, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reply: PublicKeyMessage = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let node_pub = PeerPublicKey::from_hex(&reply.public_key).unwrap();
    derive_shared_secret(client, &node_pub, Default::default()).to_password()
}

async fn error_type(response: axum::response::Response) -> String {
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    json["error_type"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_exchange_and_echo() {
    let app = setup_app();
    let client = ServerKeyPair::generate().unwrap();
    let password = exchange(&app, &client, None).await;

    let envelope = salted::encode_base64(b"ping", password.as_bytes()).unwrap();
    let response = app
        .clone()
        .oneshot(message_request(None, envelope))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );

    let reply = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(reply.starts_with("U2FsdGVkX1"));
    let plaintext =
        salted::decode_base64(&reply, password.as_bytes(), PaddingMode::Strict).unwrap();
    assert_eq!(plaintext, b"hello ping");
}

#[tokio::test]
async fn test_public_key_response_is_uncompressed_hex() {
    let app = setup_app();
    let client = ServerKeyPair::generate().unwrap();
    let body = format!(r#"{{"publicKey":"{}"}}"#, client.public_key_hex());

    let response = app.oneshot(public_key_request(None, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let key = json["publicKey"].as_str().unwrap();
    assert_eq!(key.len(), 130);
    assert!(key.starts_with("04"));
}

#[tokio::test]
async fn test_message_before_exchange_is_conflict() {
    let app = setup_app();
    let envelope = salted::encode_base64(b"too early", b"whatever").unwrap();

    let response = app.oneshot(message_request(None, envelope)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error_type"], "no_peer_key");
    assert_eq!(json["session_id"], "default");
}

#[tokio::test]
async fn test_invalid_public_key_is_bad_request() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(public_key_request(None, r#"{"publicKey":"not-hex"}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "decode_error");

    let off_curve = format!("04{}", "01".repeat(64));
    let response = app
        .oneshot(public_key_request(
            None,
            format!(r#"{{"publicKey":"{}"}}"#, off_curve),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "invalid_point");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(public_key_request(None, "{not json".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(public_key_request(None, r#"{"key":"04ab"}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "invalid_request");
}

#[tokio::test]
async fn test_garbage_envelope_is_bad_request() {
    let app = setup_app();
    let client = ServerKeyPair::generate().unwrap();
    exchange(&app, &client, None).await;

    let response = app
        .clone()
        .oneshot(message_request(None, "!!!".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "decode_error");

    // Valid base64, far too short for an envelope
    let response = app
        .oneshot(message_request(None, "AAAA".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "malformed_envelope");
}

#[tokio::test]
async fn test_session_header_isolates_clients() {
    let app = setup_app();
    let alice = ServerKeyPair::generate().unwrap();
    let bob = ServerKeyPair::generate().unwrap();

    let alice_password = exchange(&app, &alice, Some("alice")).await;
    let bob_password = exchange(&app, &bob, Some("bob")).await;
    assert_ne!(alice_password, bob_password);

    // Bob's exchange must not disturb Alice's session
    let envelope = salted::encode_base64(b"from alice", alice_password.as_bytes()).unwrap();
    let response = app
        .clone()
        .oneshot(message_request(Some("alice"), envelope))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reply = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(
        salted::decode_base64(&reply, alice_password.as_bytes(), PaddingMode::Lenient).unwrap(),
        b"hello from alice"
    );

    // Default session never exchanged
    let envelope = salted::encode_base64(b"nobody", alice_password.as_bytes()).unwrap();
    let response = app.oneshot(message_request(None, envelope)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_health_reports_sessions() {
    let app = setup_app();
    let client = ServerKeyPair::generate().unwrap();
    exchange(&app, &client, Some("tab-1")).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.sessions, 1);
    assert!(health.version["version"].is_string());
}

#[tokio::test]
async fn test_get_on_post_route_is_rejected() {
    let app = setup_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/public-key")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unique_session_headers_stay_within_cap() {
    let keypair = Arc::new(ServerKeyPair::generate().unwrap());
    let limits = SessionLimits {
        max_sessions: 16,
        ..Default::default()
    };
    let channel = SecureChannel::with_limits(keypair, CipherOptions::default(), limits);
    let app = create_app(Arc::new(AppState::new(channel.clone(), "hello ")));
    let client_hex = ServerKeyPair::generate().unwrap().public_key_hex();

    for i in 0..300 {
        let body = format!(r#"{{"publicKey":"{}"}}"#, client_hex);
        let session = format!("tab-{}", i);
        let response = app
            .clone()
            .oneshot(public_key_request(Some(&session), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(channel.peers().count().await, 16);

    // The most recent client is still served
    let client = ServerKeyPair::generate().unwrap();
    let password = exchange(&app, &client, Some("latest")).await;
    let envelope = salted::encode_base64(b"still here", password.as_bytes()).unwrap();
    let response = app
        .oneshot(message_request(Some("latest"), envelope))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
