// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenSSL EVP_BytesToKey (MD5, one iteration)
//!
//! Expands a password and an 8-byte salt into an AES-256 key and a CBC IV,
//! byte-for-byte the way `openssl enc -aes-256-cbc -md md5 -k <pw> -S <salt>`
//! and CryptoJS passphrase encryption do:
//!
//! ```text
//! D1 = MD5(password || salt)
//! D2 = MD5(D1 || password || salt)
//! D3 = MD5(D2 || password || salt)
//! key = D1 || D2   (32 bytes)
//! iv  = D3         (16 bytes)
//! ```
//!
//! MD5 is fixed by the wire format. Changing the digest breaks every peer.

use md5::{Digest, Md5};
use std::fmt;

pub const SALT_LEN: usize = 8;
pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

const DIGEST_LEN: usize = 16;

/// Key and IV produced for one (password, salt) pair
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedMaterial {
    pub key: [u8; KEY_LEN],
    pub iv: [u8; IV_LEN],
}

impl fmt::Debug for DerivedMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedMaterial { key: [REDACTED], iv: [REDACTED] }")
    }
}

/// Derive the AES-256 key and IV for a password and salt
pub fn evp_bytes_to_key(password: &[u8], salt: &[u8; SALT_LEN]) -> DerivedMaterial {
    let mut material = [0u8; KEY_LEN + IV_LEN];
    let mut previous: Option<[u8; DIGEST_LEN]> = None;

    for chunk in material.chunks_mut(DIGEST_LEN) {
        let mut hasher = Md5::new();
        if let Some(prev) = previous {
            hasher.update(prev);
        }
        hasher.update(password);
        hasher.update(salt);

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&hasher.finalize());
        chunk.copy_from_slice(&digest);
        previous = Some(digest);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..]);
    material.fill(0);

    DerivedMaterial { key, iv }
}
