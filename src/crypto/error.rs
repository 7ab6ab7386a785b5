// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! One variant per failure class of the exchange-and-cipher pipeline. Every
//! variant is terminal for the request that produced it: callers surface the
//! error, they never retry the same input.
//!
//! ## Error Variants
//!
//! - **Decode**: malformed hex or base64 input
//! - **InvalidPoint**: peer key is not a valid P-256 point
//! - **NoPeerKey**: shared secret requested before any key exchange
//! - **MalformedEnvelope**: envelope shorter than marker + salt
//! - **BadMarker**: strict decode found something other than `Salted__`
//! - **Cipher**: ciphertext body not aligned to the AES block size
//! - **Padding**: recovered pad length out of range (or, in strict mode, pad bytes wrong)
//! - **Randomness**: the OS randomness source failed
//!
//! Messages carry lengths and field names only, never key material.

use thiserror::Error;

/// Error type for all exchange and cipher operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Hex or base64 input could not be decoded
    #[error("Invalid {field} encoding: {reason}")]
    Decode { field: String, reason: String },

    /// Peer public key does not decode to a point on P-256
    #[error("Invalid peer public key: {reason}")]
    InvalidPoint { reason: String },

    /// No peer key has been exchanged for this session yet
    #[error("No peer public key exchanged for session: {session_id}")]
    NoPeerKey { session_id: String },

    /// Envelope too short to hold the marker and salt
    #[error("Malformed envelope: expected at least {min} bytes, got {actual}")]
    MalformedEnvelope { min: usize, actual: usize },

    /// First 8 bytes are not the `Salted__` marker (strict mode only)
    #[error("Malformed envelope: expected 'Salted__' marker, found {found}")]
    BadMarker { found: String },

    /// Ciphertext body cannot be processed by the block cipher
    #[error("Cipher error: {reason}")]
    Cipher { reason: String },

    /// Padding check failed after decryption
    #[error("Padding error: {reason}")]
    Padding { reason: String },

    /// System randomness unavailable
    #[error("Randomness source failed: {0}")]
    Randomness(String),
}

impl CryptoError {
    /// Short machine-readable name for logs and API responses
    pub fn kind(&self) -> &'static str {
        match self {
            CryptoError::Decode { .. } => "decode_error",
            CryptoError::InvalidPoint { .. } => "invalid_point",
            CryptoError::NoPeerKey { .. } => "no_peer_key",
            CryptoError::MalformedEnvelope { .. } => "malformed_envelope",
            CryptoError::BadMarker { .. } => "bad_marker",
            CryptoError::Cipher { .. } => "cipher_error",
            CryptoError::Padding { .. } => "padding_error",
            CryptoError::Randomness(_) => "randomness_error",
        }
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        CryptoError::Decode {
            field: "hex".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::Decode {
            field: "base64".to_string(),
            reason: err.to_string(),
        }
    }
}

// p256 reports both bad lengths and off-curve points through this type
impl From<p256::elliptic_curve::Error> for CryptoError {
    fn from(err: p256::elliptic_curve::Error) -> Self {
        CryptoError::InvalidPoint {
            reason: format!("p256 error: {}", err),
        }
    }
}
