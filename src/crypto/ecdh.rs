// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDH Shared Secret Derivation
//!
//! Standard P-256 Diffie-Hellman: the peer's public point is multiplied by
//! the node's private scalar and the x-coordinate of the result is the
//! shared secret. The secret is never hashed here; its hex rendering is the
//! *password* fed to the EVP_BytesToKey KDF in [`super::kdf`].
//!
//! ## Leading zero bytes
//!
//! The reference peers render the x-coordinate as a big integer, so leading
//! zero bytes disappear and roughly 1 in 256 secrets becomes a 62-character
//! (or shorter) hex password. [`SecretEncoding::Trimmed`] reproduces that and
//! is the default. Peers that always left-pad to 64 characters need
//! [`SecretEncoding::Padded`]; the two only disagree when the top byte is zero.

use super::{PeerPublicKey, ServerKeyPair};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the x-coordinate is rendered before use as a password
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretEncoding {
    /// Big-endian with leading zero bytes dropped
    #[default]
    Trimmed,
    /// Always 32 bytes, left-padded with zeros
    Padded,
}

impl FromStr for SecretEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trimmed" => Ok(SecretEncoding::Trimmed),
            "padded" => Ok(SecretEncoding::Padded),
            other => Err(format!(
                "unknown secret encoding '{}', expected 'trimmed' or 'padded'",
                other
            )),
        }
    }
}

/// ECDH x-coordinate bytes
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex of the secret, used verbatim as the KDF password
    pub fn to_password(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret([REDACTED; {}])", self.0.len())
    }
}

/// Compute the ECDH shared secret between the node and a peer
pub fn derive_shared_secret(
    server: &ServerKeyPair,
    peer: &PeerPublicKey,
    encoding: SecretEncoding,
) -> SharedSecret {
    let shared = p256::ecdh::diffie_hellman(
        server.secret().to_nonzero_scalar(),
        peer.as_public_key().as_affine(),
    );
    let x = shared.raw_secret_bytes();

    let bytes = match encoding {
        SecretEncoding::Padded => x.to_vec(),
        SecretEncoding::Trimmed => {
            let first = x.iter().position(|&b| b != 0).unwrap_or(x.len());
            x[first..].to_vec()
        }
    };

    SharedSecret(bytes)
}
