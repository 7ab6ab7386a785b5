// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Peer Key Storage
//!
//! Holds the most recently exchanged client public key per session. Each
//! session has exactly one slot: a new exchange replaces the previous key
//! and drops any shared secret cached for it.
//!
//! Slots are bounded two ways (see [`SessionLimits`]):
//! - a slot idle for longer than `idle_timeout_seconds` expires and is
//!   removed by [`PeerKeyStore::cleanup_expired`] or on next access
//! - at `max_sessions`, a new session first drops expired slots, then the
//!   least recently used one
//!
//! **Security**: Keys and cached secrets are stored in memory only and never
//! persisted to disk.

use crate::crypto::{
    derive_shared_secret, CryptoError, PeerPublicKey, SecretEncoding, ServerKeyPair, SharedSecret,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Session used when the caller does not name one
pub const DEFAULT_SESSION_ID: &str = "default";

/// Bounds on the number and lifetime of session slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_timeout_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_timeout_seconds: 3600,
            cleanup_interval_seconds: 300, // 5 minutes
        }
    }
}

#[derive(Clone)]
struct PeerSlot {
    peer: PeerPublicKey,
    last_seen: DateTime<Utc>,
    secret: Option<(SecretEncoding, SharedSecret)>,
}

impl PeerSlot {
    fn is_idle(&self, cutoff: Option<DateTime<Utc>>) -> bool {
        cutoff.is_some_and(|cutoff| self.last_seen < cutoff)
    }
}

/// Thread-safe map of session id to the peer's public key
///
/// # Example
///
/// ```ignore
/// let store = PeerKeyStore::with_limits(SessionLimits::default());
/// let _cleanup = store.spawn_cleanup_task();
/// store.set_from_wire("session-123", &client_hex).await?;
/// let secret = store.shared_secret("session-123", &server, SecretEncoding::Trimmed).await?;
/// store.clear("session-123").await;
/// ```
#[derive(Clone)]
pub struct PeerKeyStore {
    slots: Arc<RwLock<HashMap<String, PeerSlot>>>,
    limits: SessionLimits,
}

impl Default for PeerKeyStore {
    fn default() -> Self {
        Self::with_limits(SessionLimits::default())
    }
}

impl PeerKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bounded by `limits`; `max_sessions` below 1 is treated as 1
    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            limits: SessionLimits {
                max_sessions: limits.max_sessions.max(1),
                ..limits
            },
        }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Slots last seen before this instant are expired
    fn idle_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.limits.idle_timeout_seconds).ok()?;
        now.checked_sub_signed(chrono::Duration::try_seconds(secs)?)
    }

    /// Decode a hex public key and store it for the session
    ///
    /// The slot is only touched when decoding succeeds, so a rejected key
    /// leaves the previous one in place.
    pub async fn set_from_wire(
        &self,
        session_id: &str,
        hex_key: &str,
    ) -> Result<PeerPublicKey, CryptoError> {
        let peer = PeerPublicKey::from_hex(hex_key)?;
        self.set(session_id, peer.clone()).await;
        Ok(peer)
    }

    /// Store a peer key, replacing any previous key for the session
    pub async fn set(&self, session_id: &str, peer: PeerPublicKey) {
        let now = Utc::now();
        let mut slots = self.slots.write().await;

        if !slots.contains_key(session_id) && slots.len() >= self.limits.max_sessions {
            let cutoff = self.idle_cutoff(now);
            slots.retain(|_, slot| !slot.is_idle(cutoff));

            while slots.len() >= self.limits.max_sessions {
                let Some(oldest) = slots
                    .iter()
                    .min_by_key(|(_, slot)| slot.last_seen)
                    .map(|(id, _)| id.clone())
                else {
                    break;
                };
                slots.remove(&oldest);
                tracing::warn!(
                    "🗑️  Session limit {} reached, evicted least recently used session: {}",
                    self.limits.max_sessions,
                    oldest
                );
            }
        }

        let replaced = slots
            .insert(
                session_id.to_string(),
                PeerSlot {
                    peer,
                    last_seen: now,
                    secret: None,
                },
            )
            .is_some();
        tracing::info!(
            "🔑 Peer key stored for session: {} (replaced: {}, total sessions: {})",
            session_id,
            replaced,
            slots.len()
        );
    }

    /// The session's peer key, unless absent or expired
    pub async fn get(&self, session_id: &str) -> Option<PeerPublicKey> {
        let cutoff = self.idle_cutoff(Utc::now());
        let slots = self.slots.read().await;
        slots
            .get(session_id)
            .filter(|slot| !slot.is_idle(cutoff))
            .map(|slot| slot.peer.clone())
    }

    /// Shared secret between `server` and the session's peer
    ///
    /// Computed on first use after an exchange and cached until the peer key
    /// changes or the session is cleared. Each call marks the session as
    /// active.
    ///
    /// # Errors
    ///
    /// `CryptoError::NoPeerKey` if no key has been exchanged for the session,
    /// or the session expired.
    pub async fn shared_secret(
        &self,
        session_id: &str,
        server: &ServerKeyPair,
        encoding: SecretEncoding,
    ) -> Result<SharedSecret, CryptoError> {
        let now = Utc::now();
        let cutoff = self.idle_cutoff(now);
        let mut slots = self.slots.write().await;

        if slots.get(session_id).is_some_and(|slot| slot.is_idle(cutoff)) {
            slots.remove(session_id);
            tracing::debug!("Peer key expired for session: {}", session_id);
        }

        let slot = slots
            .get_mut(session_id)
            .ok_or_else(|| no_peer_key(session_id))?;
        slot.last_seen = now;

        if let Some((cached_encoding, secret)) = &slot.secret {
            if *cached_encoding == encoding {
                return Ok(secret.clone());
            }
        }

        let secret = derive_shared_secret(server, &slot.peer, encoding);
        slot.secret = Some((encoding, secret.clone()));
        tracing::debug!("Shared secret derived for session: {}", session_id);

        Ok(secret)
    }

    /// Remove a session's key. Should be called when a client goes away.
    pub async fn clear(&self, session_id: &str) {
        let mut slots = self.slots.write().await;
        if slots.remove(session_id).is_some() {
            tracing::info!(
                "🗑️  Peer key cleared for session: {} (remaining: {})",
                session_id,
                slots.len()
            );
        }
    }

    /// Drop every slot idle for longer than the timeout, returns how many
    pub async fn cleanup_expired(&self) -> usize {
        let cutoff = self.idle_cutoff(Utc::now());
        let mut slots = self.slots.write().await;
        let initial_count = slots.len();

        slots.retain(|_, slot| !slot.is_idle(cutoff));

        let removed = initial_count - slots.len();
        if removed > 0 {
            tracing::info!(
                "🗑️  Expired {} idle sessions (remaining: {})",
                removed,
                slots.len()
            );
        }
        removed
    }

    /// Run [`Self::cleanup_expired`] every `cleanup_interval_seconds`
    pub fn spawn_cleanup_task(&self) -> JoinHandle<()> {
        let store = self.clone();
        let period = Duration::from_secs(self.limits.cleanup_interval_seconds.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                store.cleanup_expired().await;
            }
        })
    }

    /// Number of slots held, including expired ones not yet cleaned up
    pub async fn count(&self) -> usize {
        let slots = self.slots.read().await;
        slots.len()
    }

    /// Used for testing or shutdown scenarios
    pub async fn clear_all(&self) {
        let mut slots = self.slots.write().await;
        let count = slots.len();
        slots.clear();
        tracing::info!("🗑️  Cleared all peer keys (count: {})", count);
    }
}

fn no_peer_key(session_id: &str) -> CryptoError {
    CryptoError::NoPeerKey {
        session_id: session_id.to_string(),
    }
}
