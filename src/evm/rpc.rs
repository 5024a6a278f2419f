//! Read and write capabilities the DEX core needs from a chain.
//!
//! `EvmClient` implements both against a JSON-RPC endpoint. Tests substitute an
//! in-memory chain.

use alloy::{
    primitives::{Address, TxHash, U256},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::contracts::erc20::TokenMetadata;
use crate::error::Result;

/// Raw state of a pair contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairState {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_supply: U256,
}

/// Read-only contract calls.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Factory `getPair`; the zero address means the pair was never created.
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address)
        -> Result<Address>;

    /// Tokens, reserves and LP supply of a pair contract.
    async fn get_pair_state(&self, pair: Address) -> Result<PairState>;

    /// Router `getAmountsOut` along `path`; one amount per path element.
    async fn get_amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>>;

    /// ERC20 allowance granted by `owner` to `spender`.
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// ERC20 name, symbol and decimals.
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata>;

    /// Receipt status: `None` while pending, `Some(success)` once mined.
    async fn transaction_status(&self, tx_hash: TxHash) -> Result<Option<bool>>;
}

/// Signed contract calls.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Sign `tx` with `signer` and submit it, returning as soon as the node accepts it.
    async fn send_transaction(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash>;
}
