// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Defaults, then an optional TOML file, then environment variables (a
//! `.env` file is loaded first if present):
//!
//! | Variable                           | Meaning                                   | Default   |
//! |------------------------------------|-------------------------------------------|-----------|
//! | `CIPHER_NODE_HOST`                 | bind address                              | `0.0.0.0` |
//! | `CIPHER_NODE_PORT`                 | HTTP port                                 | `8081`    |
//! | `CIPHER_STRICT_PADDING`            | full PKCS7 + marker check on decode       | `false`   |
//! | `CIPHER_SECRET_ENCODING`           | `trimmed` or `padded` ECDH secret hex     | `trimmed` |
//! | `CIPHER_NODE_PRIVATE_KEY`          | 0x-prefixed P-256 scalar; random if unset | unset     |
//! | `CIPHER_REPLY_PREFIX`              | prepended to every decrypted message      | `hello `  |
//! | `CIPHER_MAX_SESSIONS`              | session slots kept before LRU eviction    | `1000`    |
//! | `CIPHER_SESSION_IDLE_TIMEOUT_SECS` | idle seconds before a slot expires        | `3600`    |

use crate::crypto::{CipherOptions, PaddingMode, SecretEncoding, ServerKeyPair};
use crate::session::SessionLimits;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

pub const ENV_HOST: &str = "CIPHER_NODE_HOST";
pub const ENV_PORT: &str = "CIPHER_NODE_PORT";
pub const ENV_STRICT_PADDING: &str = "CIPHER_STRICT_PADDING";
pub const ENV_SECRET_ENCODING: &str = "CIPHER_SECRET_ENCODING";
pub const ENV_PRIVATE_KEY: &str = "CIPHER_NODE_PRIVATE_KEY";
pub const ENV_REPLY_PREFIX: &str = "CIPHER_REPLY_PREFIX";
pub const ENV_MAX_SESSIONS: &str = "CIPHER_MAX_SESSIONS";
pub const ENV_SESSION_IDLE_TIMEOUT: &str = "CIPHER_SESSION_IDLE_TIMEOUT_SECS";

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub cipher: CipherOptions,
    pub reply_prefix: String,
    pub sessions: SessionLimits,
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            cipher: CipherOptions::default(),
            reply_prefix: "hello ".to_string(),
            sessions: SessionLimits::default(),
            private_key: None,
        }
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cipher", &self.cipher)
            .field("reply_prefix", &self.reply_prefix)
            .field("sessions", &self.sessions)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// `.env`, then file (if given), then process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env()
    }

    /// Apply process environment overrides
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", ENV_PORT, port))?;
        }
        if let Some(strict) = lookup(ENV_STRICT_PADDING) {
            let enabled = parse_bool(&strict).ok_or_else(|| {
                anyhow!("{} must be true or false, got '{}'", ENV_STRICT_PADDING, strict)
            })?;
            self.cipher.padding = if enabled {
                PaddingMode::Strict
            } else {
                PaddingMode::Lenient
            };
        }
        if let Some(encoding) = lookup(ENV_SECRET_ENCODING) {
            self.cipher.secret_encoding = encoding
                .parse::<SecretEncoding>()
                .map_err(|e| anyhow!("{}: {}", ENV_SECRET_ENCODING, e))?;
        }
        if let Some(key) = lookup(ENV_PRIVATE_KEY) {
            if !key.trim().is_empty() {
                self.private_key = Some(key);
            }
        }
        if let Some(prefix) = lookup(ENV_REPLY_PREFIX) {
            self.reply_prefix = prefix;
        }
        if let Some(max) = lookup(ENV_MAX_SESSIONS) {
            self.sessions.max_sessions = max
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    anyhow!("{} must be a positive integer, got '{}'", ENV_MAX_SESSIONS, max)
                })?;
        }
        if let Some(timeout) = lookup(ENV_SESSION_IDLE_TIMEOUT) {
            self.sessions.idle_timeout_seconds = timeout.trim().parse().with_context(|| {
                format!(
                    "{} must be a number of seconds, got '{}'",
                    ENV_SESSION_IDLE_TIMEOUT, timeout
                )
            })?;
        }
        Ok(self)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// The configured key pair, or a freshly generated one
    pub fn load_keypair(&self) -> Result<ServerKeyPair> {
        match &self.private_key {
            Some(key) => ServerKeyPair::from_private_hex(key)
                .map_err(|e| anyhow!("{} is invalid: {}", ENV_PRIVATE_KEY, e)),
            None => {
                let pair = ServerKeyPair::generate()
                    .context("Cannot generate server key pair without system randomness")?;
                info!("Generated ephemeral server key pair for this process");
                Ok(pair)
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
