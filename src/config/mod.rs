//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::collections::{BTreeMap, HashMap};
use std::env;

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::evm::constants::{
    AVALANCHE_MAINNET_CHAIN_ID, BSC_MAINNET_CHAIN_ID, ETHEREUM_MAINNET_CHAIN_ID,
};

/// Named RPC variables for the built-in chains.
const NAMED_RPC_VARS: [(&str, u64); 3] = [
    ("ETHEREUM_RPC_URL", ETHEREUM_MAINNET_CHAIN_ID),
    ("BSC_RPC_URL", BSC_MAINNET_CHAIN_ID),
    ("AVALANCHE_RPC_URL", AVALANCHE_MAINNET_CHAIN_ID),
];

/// Prefix of per-chain RPC variables (`RPC_URL_<CHAIN_ID>`).
const RPC_URL_PREFIX: &str = "RPC_URL_";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint per chain ID.
    pub rpc_urls: BTreeMap<u64, String>,
    /// Optional private key of an external account (hex). Read-only mode when absent.
    pub private_key: Option<String>,
    /// JSON file replacing the built-in chain registry.
    pub chain_registry_path: Option<String>,
    /// Token list merged into the registry at startup.
    pub token_list_url: Option<String>,
    /// Default slippage tolerance percentage.
    pub default_slippage: Decimal,
    /// Swap deadline offset in minutes.
    pub deadline_minutes: u64,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// At least one of `ETHEREUM_RPC_URL`, `BSC_RPC_URL`, `AVALANCHE_RPC_URL` or
    /// `RPC_URL_<CHAIN_ID>` is required.
    ///
    /// Optional environment variables:
    /// - `WALLET_PRIVATE_KEY`: external account key (hex)
    /// - `CHAIN_REGISTRY_PATH`: JSON chain registry replacing the built-ins
    /// - `TOKEN_LIST_URL`: token list to merge at startup
    /// - `DEFAULT_SLIPPAGE`: percentage, 0-50 (default: 0.5)
    /// - `DEADLINE_MINUTES`: swap deadline (default: 20)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(&vars)
    }

    /// Build configuration from a set of variables instead of the process environment.
    pub fn from_lookup(vars: &HashMap<String, String>) -> Result<Self, AppError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut rpc_urls = BTreeMap::new();
        for (var, chain_id) in NAMED_RPC_VARS {
            if let Some(url) = get(var) {
                rpc_urls.insert(chain_id, url);
            }
        }
        for (key, value) in vars {
            let Some(chain_id) =
                key.strip_prefix(RPC_URL_PREFIX).and_then(|id| id.parse::<u64>().ok())
            else {
                continue;
            };
            let url = value.trim();
            if !url.is_empty() {
                rpc_urls.entry(chain_id).or_insert_with(|| url.to_string());
            }
        }

        if rpc_urls.is_empty() {
            return Err(AppError::Config(
                "No RPC endpoint configured: set ETHEREUM_RPC_URL, BSC_RPC_URL, \
                 AVALANCHE_RPC_URL or RPC_URL_<CHAIN_ID>"
                    .into(),
            ));
        }

        let default_slippage = match get("DEFAULT_SLIPPAGE") {
            Some(value) => value.parse::<Decimal>().map_err(|e| {
                AppError::Config(format!("Invalid DEFAULT_SLIPPAGE '{}': {}", value, e))
            })?,
            None => Decimal::new(5, 1),
        };
        if default_slippage < Decimal::ZERO || default_slippage > Decimal::from(50) {
            return Err(AppError::Config(
                "DEFAULT_SLIPPAGE must be between 0 and 50 (percentage)".into(),
            ));
        }

        let deadline_minutes = match get("DEADLINE_MINUTES") {
            Some(value) => value.parse::<u64>().map_err(|e| {
                AppError::Config(format!("Invalid DEADLINE_MINUTES '{}': {}", value, e))
            })?,
            None => 20,
        };
        if deadline_minutes == 0 {
            return Err(AppError::Config("DEADLINE_MINUTES must be greater than zero".into()));
        }

        Ok(Self {
            rpc_urls,
            private_key: get("WALLET_PRIVATE_KEY"),
            chain_registry_path: get("CHAIN_REGISTRY_PATH"),
            token_list_url: get("TOKEN_LIST_URL"),
            default_slippage,
            deadline_minutes,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}
