// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP surface of the node
//!
//! - `POST /public-key` with `{"publicKey": "<hex>"}` → the node's public key
//! - `POST /encrypted-message` with a base64 envelope → base64 envelope of
//!   the reply prefix followed by the decrypted message
//! - `GET /health`
//!
//! Requests may carry an `x-session-id` header; without one they share the
//! default session.

pub mod errors;
pub mod http_server;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{
    create_app, start_server, AppState, HealthResponse, PublicKeyMessage, SESSION_HEADER,
};
