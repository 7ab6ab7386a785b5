// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::crypto::CryptoError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    Crypto {
        session_id: String,
        error: CryptoError,
    },
}

impl ApiError {
    pub fn crypto(session_id: &str, error: CryptoError) -> Self {
        ApiError::Crypto {
            session_id: session_id.to_string(),
            error,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Crypto { error, .. } => match error {
                CryptoError::Decode { .. }
                | CryptoError::InvalidPoint { .. }
                | CryptoError::MalformedEnvelope { .. }
                | CryptoError::BadMarker { .. }
                | CryptoError::Cipher { .. }
                | CryptoError::Padding { .. } => StatusCode::BAD_REQUEST,
                CryptoError::NoPeerKey { .. } => StatusCode::CONFLICT,
                CryptoError::Randomness(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ApiError::InvalidRequest(msg) => ErrorResponse {
                error_type: "invalid_request".to_string(),
                message: msg.clone(),
                session_id: None,
            },
            ApiError::Crypto { session_id, error } => ErrorResponse {
                error_type: error.kind().to_string(),
                message: error.to_string(),
                session_id: Some(session_id.clone()),
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Crypto { session_id, error } => {
                write!(f, "Session {}: {}", session_id, error)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        } else {
            tracing::warn!("⚠️  {}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}
