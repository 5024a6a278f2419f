//! Chain and token registry.
//!
//! Loaded once at startup (built-ins, or a JSON file, plus an optional remote token list)
//! and shared read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::evm::chains::builtin_chains;
use crate::types::{ChainConfig, Token};

/// Word accepted in place of a chain's native symbol.
pub const NATIVE_ALIAS: &str = "NATIVE";

// ============================================================================
// Token List Types (following tokenlists.org schema)
// ============================================================================

/// Token information from token list.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenListToken {
    /// Chain ID where the token exists.
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    /// Token contract address.
    pub address: String,
    /// Token symbol (e.g., "USDC").
    pub symbol: String,
    /// Token name (e.g., "USD Coin").
    pub name: String,
    /// Number of decimals.
    pub decimals: u8,
    /// Logo URI (optional).
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
}

/// Token list response from API.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenListResponse {
    /// List name.
    pub name: String,
    /// List of tokens.
    pub tokens: Vec<TokenListToken>,
}

// ============================================================================
// Registry
// ============================================================================

/// Per-chain deployments and the tokens known on each.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainConfig>,
    /// Tokens indexed by (chain_id, symbol_uppercase).
    by_symbol: HashMap<(u64, String), Token>,
    /// Tokens indexed by (chain_id, address).
    by_address: HashMap<(u64, Address), Token>,
}

impl ChainRegistry {
    /// Build a registry from chain records.
    ///
    /// Each chain's native coin and wrapped-native token are always registered, even when
    /// its token list omits them.
    pub fn new(chains: Vec<ChainConfig>) -> Result<Self> {
        let mut registry =
            Self { chains: BTreeMap::new(), by_symbol: HashMap::new(), by_address: HashMap::new() };

        for chain in chains {
            let chain_id = chain.chain_id;
            if registry.chains.contains_key(&chain_id) {
                return Err(AppError::Config(format!("Duplicate chain id {}", chain_id)));
            }

            registry.insert(chain.native_token());
            for token in &chain.tokens {
                if token.chain_id != chain_id {
                    return Err(AppError::Config(format!(
                        "Token {} is listed under chain {} but declares chain {}",
                        token.symbol, chain_id, token.chain_id
                    )));
                }
                registry.insert(token.clone());
            }
            if !registry.by_address.contains_key(&(chain_id, chain.wrapped_native)) {
                let symbol = format!("W{}", chain.native.symbol);
                let name = format!("Wrapped {}", chain.native.name);
                registry.insert(Token::erc20(
                    chain_id,
                    chain.wrapped_native,
                    symbol,
                    name,
                    chain.native.decimals,
                ));
            }

            registry.chains.insert(chain_id, chain);
        }

        Ok(registry)
    }

    /// The built-in Ethereum, BNB Smart Chain and Avalanche deployments.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_chains())
    }

    /// Parse a JSON array of chain records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let chains: Vec<ChainConfig> = serde_json::from_str(json)?;
        Self::new(chains)
    }

    /// Load a JSON array of chain records from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read chain registry {}: {}", path.display(), e))
        })?;
        let registry = Self::from_json_str(&json)?;
        info!(path = %path.display(), chains = registry.chains.len(), "Loaded chain registry");
        Ok(registry)
    }

    /// Registry described by `config`: the JSON file or the built-ins, plus the token list.
    ///
    /// A token list that cannot be fetched is logged and skipped.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut registry = match &config.chain_registry_path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::builtin()?,
        };

        if let Some(url) = &config.token_list_url {
            if let Err(e) = registry.load_token_list(url).await {
                warn!(url = %url, error = %e, "Failed to load token list, using registry as is");
            }
        }

        Ok(registry)
    }

    /// Fetch a token list and merge the entries for configured chains.
    ///
    /// # Returns
    /// The number of tokens added.
    pub async fn load_token_list(&mut self, url: &str) -> Result<usize> {
        info!("Fetching token list from {}", url);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to fetch token list: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Transport(format!(
                "Token list API returned status: {}",
                response.status()
            )));
        }

        let token_list: TokenListResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse token list: {}", e)))?;

        Ok(self.merge_token_list(token_list))
    }

    /// Merge a token list. Entries already registered keep their existing metadata.
    pub fn merge_token_list(&mut self, token_list: TokenListResponse) -> usize {
        let mut count = 0;

        for token in token_list.tokens {
            if !self.chains.contains_key(&token.chain_id) {
                continue;
            }

            let address = match token.address.parse::<Address>() {
                Ok(addr) => addr,
                Err(e) => {
                    warn!("Invalid token address {}: {}", token.address, e);
                    continue;
                }
            };

            if self.by_address.contains_key(&(token.chain_id, address)) {
                continue;
            }

            let entry =
                Token::erc20(token.chain_id, address, token.symbol, token.name, token.decimals);
            self.insert(match token.logo_uri {
                Some(logo_uri) => entry.with_logo(logo_uri),
                None => entry,
            });
            count += 1;
        }

        info!(list = %token_list.name, added = count, "Merged token list");
        count
    }

    fn insert(&mut self, token: Token) {
        let symbol_key = (token.chain_id, token.symbol.to_uppercase());
        self.by_symbol.entry(symbol_key).or_insert_with(|| token.clone());
        self.by_address.insert((token.chain_id, token.address), token);
    }

    /// Configuration of a chain.
    pub fn chain(&self, chain_id: u64) -> Result<&ChainConfig> {
        self.chains.get(&chain_id).ok_or(AppError::UnknownChain(chain_id))
    }

    /// All chains, ordered by chain id.
    pub fn chains(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.values()
    }

    pub fn chain_ids(&self) -> Vec<u64> {
        self.chains.keys().copied().collect()
    }

    /// The native coin of a chain.
    pub fn native_token(&self, chain_id: u64) -> Result<Token> {
        Ok(self.chain(chain_id)?.native_token())
    }

    pub fn token_by_address(&self, chain_id: u64, address: Address) -> Option<&Token> {
        self.by_address.get(&(chain_id, address))
    }

    /// Case-insensitive symbol lookup; `native` names the chain's native coin.
    pub fn token_by_symbol(&self, chain_id: u64, symbol: &str) -> Option<&Token> {
        let symbol = symbol.trim().to_uppercase();
        if symbol == NATIVE_ALIAS {
            let native = &self.chains.get(&chain_id)?.native.symbol;
            return self.by_symbol.get(&(chain_id, native.to_uppercase()));
        }
        self.by_symbol.get(&(chain_id, symbol))
    }

    /// Whether the token is part of the registry for its chain.
    pub fn is_listed(&self, token: &Token) -> bool {
        self.by_address.contains_key(&(token.chain_id, token.address))
    }

    /// Every registered token of a chain, sorted by symbol.
    pub fn tokens(&self, chain_id: u64) -> Vec<Token> {
        let mut tokens: Vec<Token> =
            self.by_address.values().filter(|t| t.chain_id == chain_id).cloned().collect();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }
}
