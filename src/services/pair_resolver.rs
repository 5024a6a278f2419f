//! Direct pair discovery against a chain's AMM factory.
//!
//! A missing pair is the common case, so lookup failures resolve to `None` instead of an
//! error. They are still logged.

use std::sync::Arc;

use alloy::primitives::Address;

use crate::{
    evm::ChainReader,
    types::{ChainConfig, PairInfo, Token},
};

/// Resolves pairs and their reserves on one chain.
#[derive(Clone)]
pub struct PairResolver {
    chain: Arc<ChainConfig>,
    reader: Arc<dyn ChainReader>,
}

impl PairResolver {
    pub fn new(chain: Arc<ChainConfig>, reader: Arc<dyn ChainReader>) -> Self {
        Self { chain, reader }
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Pair contract for two tokens, in either order.
    pub async fn get_pair_address(&self, token_a: &Token, token_b: &Token) -> Option<Address> {
        let a = self.chain.addressable(token_a);
        let b = self.chain.addressable(token_b);
        self.pair_address(a, b).await
    }

    /// Pair state for two tokens, or `None` when they share no pair.
    pub async fn get_pair_info(&self, token_a: &Token, token_b: &Token) -> Option<PairInfo> {
        let a = self.chain.addressable(token_a);
        let b = self.chain.addressable(token_b);
        self.pair_info(a, b).await
    }

    /// Pair contract for two addressable tokens.
    pub async fn pair_address(&self, a: Address, b: Address) -> Option<Address> {
        if a == b {
            return None;
        }

        match self.reader.get_pair(self.chain.factory, a, b).await {
            Ok(pair) if pair == Address::ZERO => None,
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::debug!(
                    chain_id = self.chain.chain_id,
                    token_a = %a,
                    token_b = %b,
                    error = %e,
                    "Pair lookup failed, treating as no pair"
                );
                None
            }
        }
    }

    pub async fn has_pair(&self, a: Address, b: Address) -> bool {
        self.pair_address(a, b).await.is_some()
    }

    /// Pair state for two addressable tokens.
    pub async fn pair_info(&self, a: Address, b: Address) -> Option<PairInfo> {
        let pair_address = self.pair_address(a, b).await?;

        match self.reader.get_pair_state(pair_address).await {
            Ok(state) => Some(PairInfo {
                token0: state.token0,
                token1: state.token1,
                pair_address,
                reserve0: state.reserve0,
                reserve1: state.reserve1,
                total_supply: state.total_supply,
            }),
            Err(e) => {
                tracing::warn!(
                    chain_id = self.chain.chain_id,
                    pair = %pair_address,
                    error = %e,
                    "Failed to read pair reserves"
                );
                None
            }
        }
    }
}
