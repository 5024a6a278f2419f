//! Multichain DEX Library
//!
//! Quoting, routing and swap execution for Uniswap V2 style DEXes on several EVM chains,
//! with a Model Context Protocol server on top.
//!
//! # Features
//!
//! - **Routing**: direct pairs first, then one or two hops through per-chain bridge tokens
//! - **Quotes**: router-simulated output with compounded price impact; wrap/unwrap quote 1:1
//! - **Swaps**: native-in, native-out and token-to-token router calls with slippage and deadline
//! - **Chains**: one data-driven adapter per chain (Uniswap V2, PancakeSwap V2, Trader Joe)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use multichain_dex::{ChainRegistry, Dex, DexAdapter, EvmClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(ChainRegistry::builtin()?);
//!     let client = Arc::new(EvmClient::new("https://eth.llamarpc.com", 1)?);
//!     let dex = DexAdapter::new(registry, 1)?.with_reader(client);
//!
//!     let eth = dex.resolve_token("ETH").await?;
//!     let usdc = dex.resolve_token("USDC").await?;
//!     let quote = dex.get_quote(&eth, &usdc, "1.5").await?;
//!     println!("{} USDC via {}", quote.amount_out, quote.route);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod evm;
pub mod mcp;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use evm::{
    Account, ChainReader, ChainWriter, CredentialPrompt, CustodialUnlocker, EvmClient,
    SessionEvent, WalletSession,
};
pub use mcp::MultichainDexServer;
pub use services::{ChainRegistry, Dex, DexAdapter, QuoteRequestTracker};
