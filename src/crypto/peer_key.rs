// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Peer Public Key Decoding
//!
//! The client sends its P-256 public key as hex of the 65-byte uncompressed
//! SEC1 encoding. Compressed points are rejected: the browser client and the
//! exchange response both use the uncompressed form.

use super::keypair::UNCOMPRESSED_POINT_LEN;
use super::CryptoError;
use p256::{elliptic_curve::sec1::ToEncodedPoint, PublicKey};

const UNCOMPRESSED_TAG: u8 = 0x04;

/// A validated counterpart public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerPublicKey {
    point: PublicKey,
}

impl PeerPublicKey {
    /// Decode a peer key from its hex wire form
    ///
    /// # Errors
    ///
    /// - `CryptoError::Decode` if the input is not valid hex
    /// - `CryptoError::InvalidPoint` if the bytes are not a 65-byte
    ///   uncompressed point on P-256
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|e| CryptoError::Decode {
            field: "public_key".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Decode a peer key from uncompressed SEC1 bytes
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != UNCOMPRESSED_POINT_LEN {
            return Err(CryptoError::InvalidPoint {
                reason: format!(
                    "expected {} bytes, got {}",
                    UNCOMPRESSED_POINT_LEN,
                    bytes.len()
                ),
            });
        }
        if bytes[0] != UNCOMPRESSED_TAG {
            return Err(CryptoError::InvalidPoint {
                reason: format!("expected uncompressed tag 0x04, got 0x{:02x}", bytes[0]),
            });
        }

        let point = PublicKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPoint {
            reason: "point is not on curve P-256".to_string(),
        })?;

        Ok(Self { point })
    }

    pub fn as_public_key(&self) -> &PublicKey {
        &self.point
    }

    /// Uncompressed hex form, as it would appear on the wire
    pub fn to_hex(&self) -> String {
        hex::encode(self.point.to_encoded_point(false).as_bytes())
    }
}

impl From<PublicKey> for PeerPublicKey {
    fn from(point: PublicKey) -> Self {
        Self { point }
    }
}
