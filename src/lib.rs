// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod session;
pub mod version;

pub use config::NodeConfig;
pub use crypto::{CipherOptions, CryptoError, PaddingMode, SecretEncoding, ServerKeyPair};
pub use session::{PeerKeyStore, SecureChannel, SessionLimits, DEFAULT_SESSION_ID};
