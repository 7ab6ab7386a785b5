// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Secure Channel
//!
//! The two operations the transport layer needs:
//!
//! 1. **Exchange public keys**: store the client's key for a session and
//!    hand back the node's key
//! 2. **Encrypt/decrypt a message**: run the salted codec with the session's
//!    ECDH secret (hex) as the passphrase
//!
//! Everything here is CPU-bound; the only awaits are on the session map lock.

use super::{PeerKeyStore, SessionLimits};
use crate::crypto::{salted, CipherOptions, CryptoError, ServerKeyPair};
use std::sync::Arc;
use tracing::{debug, info};

/// Node key pair + per-session peer keys + codec settings
#[derive(Clone)]
pub struct SecureChannel {
    keypair: Arc<ServerKeyPair>,
    peers: PeerKeyStore,
    options: CipherOptions,
}

impl SecureChannel {
    pub fn new(keypair: Arc<ServerKeyPair>, options: CipherOptions) -> Self {
        Self::with_limits(keypair, options, SessionLimits::default())
    }

    pub fn with_limits(
        keypair: Arc<ServerKeyPair>,
        options: CipherOptions,
        limits: SessionLimits,
    ) -> Self {
        Self {
            keypair,
            peers: PeerKeyStore::with_limits(limits),
            options,
        }
    }

    pub fn options(&self) -> CipherOptions {
        self.options
    }

    pub fn peers(&self) -> &PeerKeyStore {
        &self.peers
    }

    pub fn server_public_key_hex(&self) -> String {
        self.keypair.public_key_hex()
    }

    /// Store the client's public key and return the node's public key (hex)
    pub async fn exchange_public_keys(
        &self,
        session_id: &str,
        client_public_hex: &str,
    ) -> Result<String, CryptoError> {
        let peer = self.peers.set_from_wire(session_id, client_public_hex).await?;
        info!(
            "Public key exchange completed for session: {} (client key: {}…)",
            session_id,
            &peer.to_hex()[..16]
        );
        Ok(self.server_public_key_hex())
    }

    /// Hex passphrase for the session, as the client computes it
    pub async fn session_password(&self, session_id: &str) -> Result<String, CryptoError> {
        let secret = self
            .peers
            .shared_secret(session_id, &self.keypair, self.options.secret_encoding)
            .await?;
        Ok(secret.to_password())
    }

    /// Encrypt `plaintext` for the session's client, base64 envelope out
    pub async fn encrypt_message(
        &self,
        session_id: &str,
        plaintext: &[u8],
    ) -> Result<String, CryptoError> {
        let password = self.session_password(session_id).await?;
        let encoded = salted::encode_base64(plaintext, password.as_bytes())?;
        debug!(
            "Encrypted {} bytes for session: {} ({} base64 chars)",
            plaintext.len(),
            session_id,
            encoded.len()
        );
        Ok(encoded)
    }

    /// Decrypt a base64 envelope sent by the session's client
    pub async fn decrypt_message(
        &self,
        session_id: &str,
        encoded: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        let password = self.session_password(session_id).await?;
        let plaintext =
            salted::decode_base64(encoded, password.as_bytes(), self.options.padding)?;
        debug!(
            "Decrypted {} bytes for session: {}",
            plaintext.len(),
            session_id
        );
        Ok(plaintext)
    }
}
