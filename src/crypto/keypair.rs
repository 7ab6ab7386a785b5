// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server Key Pair (P-256)
//!
//! The node holds exactly one P-256 key pair for its lifetime. It is either
//! generated at startup from the OS randomness source or loaded from
//! configuration, and is never persisted by the node.
//!
//! ## Security Considerations
//!
//! - The private scalar is never logged; `Debug` prints the public key only
//! - The key pair is immutable after construction and can be shared via `Arc`

use super::CryptoError;
use p256::{elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use tracing::info;

/// Length of an uncompressed SEC1 P-256 point (`0x04 || X || Y`)
pub const UNCOMPRESSED_POINT_LEN: usize = 65;

/// Length of a P-256 private scalar
pub const PRIVATE_KEY_LEN: usize = 32;

/// The node's elliptic-curve key pair
#[derive(Clone)]
pub struct ServerKeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl ServerKeyPair {
    /// Generate a fresh key pair with a uniformly random scalar
    ///
    /// Candidates outside `[1, n)` are rejected and resampled, so the scalar
    /// is uniform over the valid range.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Randomness` if the OS randomness source fails.
    /// Callers should treat this as fatal.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut candidate = [0u8; PRIVATE_KEY_LEN];
        loop {
            OsRng
                .try_fill_bytes(&mut candidate)
                .map_err(|e| CryptoError::Randomness(e.to_string()))?;

            if let Ok(secret) = SecretKey::from_slice(&candidate) {
                candidate.fill(0);
                return Ok(Self::from_secret(secret));
            }
        }
    }

    /// Build a key pair from a raw 32-byte private scalar
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(CryptoError::Decode {
                field: "private_key".to_string(),
                reason: format!(
                    "expected {} bytes, got {}",
                    PRIVATE_KEY_LEN,
                    bytes.len()
                ),
            });
        }

        let secret = SecretKey::from_slice(bytes).map_err(|_| CryptoError::Decode {
            field: "private_key".to_string(),
            reason: "scalar is zero or not below the curve order".to_string(),
        })?;

        Ok(Self::from_secret(secret))
    }

    /// Build a key pair from a hex private scalar, with or without `0x` prefix
    pub fn from_private_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let trimmed = hex_key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped).map_err(|e| CryptoError::Decode {
            field: "private_key".to_string(),
            reason: e.to_string(),
        })?;

        let pair = Self::from_private_bytes(&bytes)?;
        info!("Server key pair loaded from configured private key");
        Ok(pair)
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Public key in uncompressed SEC1 form (65 bytes)
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Public key as lowercase hex, the wire form of the exchange
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Private scalar as hex, for key generation tooling only
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret.to_bytes())
    }
}

impl fmt::Debug for ServerKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerKeyPair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
