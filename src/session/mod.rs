// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-session key exchange state
//!
//! Peer keys are kept per session id instead of in a single global slot, so
//! concurrent clients cannot overwrite each other's keys. Callers that do not
//! track sessions use [`DEFAULT_SESSION_ID`].

pub mod channel;
pub mod store;

pub use channel::SecureChannel;
pub use store::{PeerKeyStore, SessionLimits, DEFAULT_SESSION_ID};
