// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::ApiError;
use crate::config::NodeConfig;
use crate::session::{SecureChannel, DEFAULT_SESSION_ID};
use crate::version;

/// Header a client can set to get its own peer-key slot
pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
pub struct AppState {
    pub channel: SecureChannel,
    pub reply_prefix: String,
}

impl AppState {
    pub fn new(channel: SecureChannel, reply_prefix: impl Into<String>) -> Self {
        Self {
            channel,
            reply_prefix: reply_prefix.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyMessage {
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: serde_json::Value,
    pub sessions: usize,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/public-key", post(public_key_handler))
        .route("/encrypted-message", post(encrypted_message_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(config: &NodeConfig) -> anyhow::Result<()> {
    let keypair = Arc::new(config.load_keypair()?);
    let channel = SecureChannel::with_limits(keypair, config.cipher, config.sessions);
    tracing::info!(
        "🔑 Server public key: {}",
        channel.server_public_key_hex()
    );
    tracing::info!(
        "Session limits: max {} sessions, idle timeout {}s",
        config.sessions.max_sessions,
        config.sessions.idle_timeout_seconds
    );
    let _cleanup = channel.peers().spawn_cleanup_task();

    let state = Arc::new(AppState::new(channel, config.reply_prefix.clone()));
    let app = create_app(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::get_version_info(),
        sessions: state.channel.peers().count().await,
    })
}

async fn public_key_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<PublicKeyMessage>, JsonRejection>,
) -> Result<Json<PublicKeyMessage>, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::InvalidRequest(format!("Invalid request body: {}", e)))?;
    let session_id = session_id(&headers);

    let server_key = state
        .channel
        .exchange_public_keys(&session_id, &request.public_key)
        .await
        .map_err(|e| ApiError::crypto(&session_id, e))?;

    Ok(Json(PublicKeyMessage {
        public_key: server_key,
    }))
}

async fn encrypted_message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, ApiError> {
    let session_id = session_id(&headers);

    let message = state
        .channel
        .decrypt_message(&session_id, &body)
        .await
        .map_err(|e| ApiError::crypto(&session_id, e))?;

    let mut reply = state.reply_prefix.as_bytes().to_vec();
    reply.extend_from_slice(&message);

    let encoded = state
        .channel
        .encrypt_message(&session_id, &reply)
        .await
        .map_err(|e| ApiError::crypto(&session_id, e))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        encoded,
    )
        .into_response())
}
