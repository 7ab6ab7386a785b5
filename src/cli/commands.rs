// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::NodeConfig;
use crate::crypto::{
    derive_shared_secret, salted, PaddingMode, PeerPublicKey, SecretEncoding, ServerKeyPair,
};

/// Arguments for serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TOML configuration file; environment variables still override it
    #[arg(long, env = "CIPHER_NODE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides config and CIPHER_NODE_PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

/// Arguments for encrypt command
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Passphrase (e.g. the hex shared secret)
    #[arg(long, env = "CIPHER_PASSWORD")]
    pub password: String,

    /// Plaintext message
    pub message: String,

    /// Fixed 8-byte salt as 16 hex chars, for reproducing openssl -S output
    #[arg(long)]
    pub salt: Option<String>,
}

/// Arguments for decrypt command
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Passphrase (e.g. the hex shared secret)
    #[arg(long, env = "CIPHER_PASSWORD")]
    pub password: String,

    /// Base64 "Salted__" envelope
    pub envelope: String,

    /// Verify every pad byte and the Salted__ marker
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for shared-secret command
#[derive(Args, Debug)]
pub struct SharedSecretArgs {
    /// Own P-256 private key (hex, optional 0x prefix)
    #[arg(long, env = "CIPHER_NODE_PRIVATE_KEY")]
    pub private_key: String,

    /// Peer public key (hex, 65-byte uncompressed)
    #[arg(long)]
    pub peer: String,

    /// Left-pad the x-coordinate to 32 bytes
    #[arg(long)]
    pub padded: bool,
}

/// Load configuration and run the HTTP server
pub async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = NodeConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }
    info!("Starting with {:?}", config);
    crate::api::start_server(&config).await
}

/// Print a fresh P-256 key pair
pub fn keygen() -> Result<()> {
    let pair = ServerKeyPair::generate()?;
    println!("private_key: 0x{}", pair.private_key_hex());
    println!("public_key:  {}", pair.public_key_hex());
    Ok(())
}

pub fn encrypt(args: EncryptArgs) -> Result<()> {
    let envelope = match args.salt {
        Some(salt_hex) => {
            let salt = parse_salt(&salt_hex)?;
            salted::encode_with_salt(args.message.as_bytes(), args.password.as_bytes(), &salt)?
        }
        None => salted::encode(args.message.as_bytes(), args.password.as_bytes())?,
    };

    println!("{}", BASE64.encode(envelope));
    Ok(())
}

pub fn decrypt(args: DecryptArgs) -> Result<()> {
    let mode = if args.strict {
        PaddingMode::Strict
    } else {
        PaddingMode::Lenient
    };
    let plaintext = salted::decode_base64(&args.envelope, args.password.as_bytes(), mode)?;
    println!("{}", String::from_utf8_lossy(&plaintext));
    Ok(())
}

pub fn shared_secret(args: SharedSecretArgs) -> Result<()> {
    let pair = ServerKeyPair::from_private_hex(&args.private_key)?;
    let peer = PeerPublicKey::from_hex(&args.peer)?;
    let encoding = if args.padded {
        SecretEncoding::Padded
    } else {
        SecretEncoding::Trimmed
    };
    println!("{}", derive_shared_secret(&pair, &peer, encoding).to_password());
    Ok(())
}

fn parse_salt(salt_hex: &str) -> Result<[u8; 8]> {
    let bytes = hex::decode(salt_hex.trim()).context("Salt must be hex")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow!("Salt must be 8 bytes, got {}", b.len()))
}
