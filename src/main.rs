//! Multichain DEX MCP Server
//!
//! A Model Context Protocol server for quoting and executing swaps across EVM DEXes.

use std::sync::Arc;

use rmcp::ServiceExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use multichain_dex::{ChainRegistry, Config, MultichainDexServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting Multichain DEX MCP Server");

    // Load chain registry once; read-only from here on
    let registry = Arc::new(ChainRegistry::from_config(&config).await?);

    // Create the server
    let server = MultichainDexServer::new(config, registry)?;

    // Run with stdio transport
    let transport = rmcp::transport::stdio();
    let running = server.serve(transport).await?;

    // Wait for the server to finish
    running.waiting().await?;

    Ok(())
}
