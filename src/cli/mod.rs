// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Salted Exchange Node CLI
#[derive(Parser, Debug)]
#[command(name = "salted-cli")]
#[command(version)]
#[command(about = "ECDH key exchange and OpenSSL-compatible salted AES tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP key exchange server
    Serve(commands::ServeArgs),

    /// Generate a P-256 key pair
    Keygen,

    /// Encrypt a message into a base64 Salted__ envelope
    Encrypt(commands::EncryptArgs),

    /// Decrypt a base64 Salted__ envelope
    Decrypt(commands::DecryptArgs),

    /// Derive the hex passphrase from a private key and a peer public key
    SharedSecret(commands::SharedSecretArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve(args).await,
        Commands::Keygen => commands::keygen(),
        Commands::Encrypt(args) => commands::encrypt(args),
        Commands::Decrypt(args) => commands::decrypt(args),
        Commands::SharedSecret(args) => commands::shared_secret(args),
    }
}
