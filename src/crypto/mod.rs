// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Key Exchange and Salted Cipher Module
//!
//! This module implements the cryptographic pipeline between the node and a
//! browser client:
//!
//! - **Key Pair**: one P-256 key pair held by the node for its lifetime
//! - **Peer Key**: decoding and validation of the client's public key
//! - **ECDH**: shared secret = x-coordinate of `peer_public * node_private`
//! - **KDF**: OpenSSL EVP_BytesToKey (MD5) from password + salt to key + IV
//! - **Salted Cipher**: "Salted__" envelope with AES-256-CBC and PKCS7 padding
//!
//! ## Security Considerations
//!
//! - Key material lives in memory only and is never logged
//! - CBC without a MAC gives confidentiality only, no integrity
//! - MD5 and the envelope layout are fixed by OpenSSL/CryptoJS compatibility
//!
//! ## Protocol Flow
//!
//! 1. Client generates a P-256 key pair and sends its public key (hex)
//! 2. Node stores it for the session and answers with its own public key
//! 3. Both sides compute the ECDH x-coordinate and hex-encode it
//! 4. That hex string is the passphrase for every message in both directions
//! 5. Each message gets a fresh salt, hence a fresh key and IV

pub mod ecdh;
pub mod error;
pub mod kdf;
pub mod keypair;
pub mod padding;
pub mod peer_key;
pub mod salted;

pub use ecdh::{derive_shared_secret, SecretEncoding, SharedSecret};
pub use error::CryptoError;
pub use kdf::{evp_bytes_to_key, DerivedMaterial};
pub use keypair::ServerKeyPair;
pub use padding::PaddingMode;
pub use peer_key::PeerPublicKey;
pub use salted::{decode, decode_base64, encode, encode_base64, encode_with_salt};

use serde::{Deserialize, Serialize};

/// Codec settings shared by every session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherOptions {
    #[serde(default)]
    pub padding: PaddingMode,
    #[serde(default)]
    pub secret_encoding: SecretEncoding,
}
