// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use salted_exchange_node::{api::start_server, config::NodeConfig, version};
use std::{env, path::PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🚀 Starting {}", version::get_version_string());

    let config_path = env::var("CIPHER_NODE_CONFIG").ok().map(PathBuf::from);
    let config = NodeConfig::load(config_path.as_deref())?;
    tracing::info!("Configuration: {:?}", config);

    tokio::select! {
        result = start_server(&config) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Shutting down...");
            Ok(())
        }
    }
}
