//! EVM RPC client.

use alloy::{
    network::{Ethereum, EthereumWallet, ReceiptResponse as _},
    primitives::{Address, TxHash, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{
    contracts::{
        erc20::{TokenMetadata, IERC20},
        uniswap_v2::{IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02},
    },
    rpc::{ChainReader, ChainWriter, PairState},
};
use crate::error::{AppError, Result};

/// Type alias for the HTTP provider.
pub type HttpProvider = RootProvider<Ethereum>;

/// JSON-RPC client for one chain, with lazy initialization.
#[derive(Clone)]
pub struct EvmClient {
    /// The underlying read provider.
    provider: Arc<HttpProvider>,
    /// RPC URL, reused to build signing providers.
    rpc_url: Url,
    /// Chain this endpoint is configured for.
    expected_chain_id: u64,
    /// Lazily fetched chain ID.
    chain_id: Arc<OnceCell<u64>>,
}

impl EvmClient {
    /// Create a new client for `expected_chain_id`.
    ///
    /// Note: This does NOT make any network calls. The connection is
    /// established lazily when the first operation is performed.
    pub fn new(rpc_url: &str, expected_chain_id: u64) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        #[allow(deprecated)]
        let provider = ProviderBuilder::new().connect_http(url.clone()).root().clone();

        tracing::info!(
            rpc_url = %rpc_url,
            chain_id = expected_chain_id,
            "EVM client created (lazy initialization)"
        );

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: url,
            expected_chain_id,
            chain_id: Arc::new(OnceCell::new()),
        })
    }

    /// Get the chain ID reported by the node, failing if it is not the configured chain.
    pub async fn chain_id(&self) -> Result<u64> {
        let chain_id = *self
            .chain_id
            .get_or_try_init(|| async {
                let chain_id = self.provider.get_chain_id().await?;
                tracing::info!(
                    chain_id = chain_id,
                    rpc_url = %self.rpc_url,
                    "Connected to EVM node"
                );
                Ok::<u64, AppError>(chain_id)
            })
            .await?;

        if chain_id != self.expected_chain_id {
            return Err(AppError::Config(format!(
                "RPC {} serves chain {} but is configured for chain {}",
                self.rpc_url, chain_id, self.expected_chain_id
            )));
        }
        Ok(chain_id)
    }

    /// The chain this client is configured for.
    pub fn expected_chain_id(&self) -> u64 {
        self.expected_chain_id
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }
}

#[async_trait]
impl ChainReader for EvmClient {
    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        let factory = IUniswapV2Factory::new(factory, self.provider().clone());
        let pair: Address = factory.getPair(token_a, token_b).call().await?;
        Ok(pair)
    }

    async fn get_pair_state(&self, pair: Address) -> Result<PairState> {
        let contract = IUniswapV2Pair::new(pair, self.provider().clone());

        let token0: Address = contract.token0().call().await?;
        let token1: Address = contract.token1().call().await?;
        let reserves = contract.getReserves().call().await?;
        let total_supply: U256 = contract.totalSupply().call().await?;

        Ok(PairState {
            token0,
            token1,
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
            total_supply,
        })
    }

    async fn get_amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        let router = IUniswapV2Router02::new(router, self.provider().clone());
        let amounts: Vec<U256> = router.getAmountsOut(amount_in, path.to_vec()).call().await?;
        Ok(amounts)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let contract = IERC20::new(token, self.provider().clone());
        let allowance: U256 = contract.allowance(owner, spender).call().await?;
        Ok(allowance)
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata> {
        let contract = IERC20::new(token, self.provider().clone());

        let symbol = contract.symbol().call().await.unwrap_or_else(|_| "UNKNOWN".to_string());
        let name = contract.name().call().await.unwrap_or_else(|_| "Unknown Token".to_string());

        // No fallback: a guessed decimal count silently scales every quote.
        let decimals: u8 = contract.decimals().call().await?;

        Ok(TokenMetadata { address: token, name, symbol, decimals })
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> Result<Option<bool>> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.map(|r| r.status()))
    }
}

#[async_trait]
impl ChainWriter for EvmClient {
    async fn send_transaction(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash> {
        // Refuse to sign for a node serving another chain.
        self.chain_id().await?;

        let wallet = EthereumWallet::from(signer.clone());

        #[allow(deprecated)]
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(self.rpc_url.clone());

        let pending = provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(
            chain_id = self.expected_chain_id,
            tx_hash = %tx_hash,
            "Transaction submitted"
        );

        Ok(tx_hash)
    }
}
