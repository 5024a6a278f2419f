//! Uniform DEX contract and its single, configuration-driven implementation.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::watch;

use super::{
    swap::{DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_POLL_INTERVAL},
    ChainRegistry, PairResolver, QuoteEngine, RoutePlanner, SwapExecutor,
};
use crate::{
    error::{AppError, Result},
    evm::{
        constants::NATIVE_TOKEN_ADDRESS, ChainReader, ChainWriter, CredentialPrompt, WalletSession,
    },
    types::{ChainConfig, PairInfo, QuoteResult, Route, SwapParams, SwapStatus, Token},
};

/// Operations every chain/protocol exposes, whatever its router calls things.
#[async_trait]
pub trait Dex: Send + Sync {
    /// Protocol display name.
    fn name(&self) -> &str;

    fn chain_id(&self) -> u64;

    async fn get_quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: &str,
    ) -> Result<QuoteResult>;

    /// Empty route when no liquidity path exists.
    async fn get_swap_route(&self, token_in: &Token, token_out: &Token) -> Result<Route>;

    /// Submit a swap from the session's account and return the transaction hash.
    async fn execute_swap(&self, params: &SwapParams) -> Result<TxHash>;

    async fn get_pair_info(&self, token_a: &Token, token_b: &Token) -> Result<Option<PairInfo>>;

    /// Registry membership. Quoting does not require it.
    fn is_token_supported(&self, token: &Token) -> bool;
}

/// [`Dex`] for any Uniswap V2 style deployment described by a [`ChainConfig`].
///
/// Reads need a [`ChainReader`], writes a [`ChainWriter`] and a connected account; missing
/// capabilities surface as [`AppError::NoClient`], [`AppError::NoWallet`] and
/// [`AppError::NoAccount`].
#[derive(Clone)]
pub struct DexAdapter {
    chain: Arc<ChainConfig>,
    registry: Arc<ChainRegistry>,
    reader: Option<Arc<dyn ChainReader>>,
    writer: Option<Arc<dyn ChainWriter>>,
    session: WalletSession,
    prompt: Option<Arc<dyn CredentialPrompt>>,
    status: Arc<watch::Sender<SwapStatus>>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl DexAdapter {
    pub fn new(registry: Arc<ChainRegistry>, chain_id: u64) -> Result<Self> {
        let chain = Arc::new(registry.chain(chain_id)?.clone());
        let (status, _) = watch::channel(SwapStatus::Idle);

        Ok(Self {
            chain,
            registry,
            reader: None,
            writer: None,
            session: WalletSession::new(),
            prompt: None,
            status: Arc::new(status),
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        })
    }

    pub fn with_reader(mut self, reader: Arc<dyn ChainReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn ChainWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_session(mut self, session: WalletSession) -> Self {
        self.session = session;
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn CredentialPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_polling(mut self, poll_interval: Duration, confirmation_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.confirmation_timeout = confirmation_timeout;
        self
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Whether reads can be served.
    pub fn has_client(&self) -> bool {
        self.reader.is_some()
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Watch the progress of swaps submitted through this adapter.
    pub fn subscribe_status(&self) -> watch::Receiver<SwapStatus> {
        self.status.subscribe()
    }

    fn reader(&self) -> Result<Arc<dyn ChainReader>> {
        self.reader.clone().ok_or(AppError::NoClient)
    }

    fn resolver(&self) -> Result<PairResolver> {
        Ok(PairResolver::new(self.chain.clone(), self.reader()?))
    }

    fn quote_engine(&self) -> Result<QuoteEngine> {
        Ok(QuoteEngine::new(self.chain.clone(), self.reader()?))
    }

    fn executor(&self) -> Result<SwapExecutor> {
        let reader = self.reader()?;
        let writer = self.writer.clone().ok_or(AppError::NoWallet)?;
        Ok(SwapExecutor::new(self.chain.clone(), reader, writer)
            .with_status_channel(self.status.clone())
            .with_polling(self.poll_interval, self.confirmation_timeout))
    }

    fn ensure_on_chain(&self, token: &Token) -> Result<()> {
        if token.chain_id != self.chain.chain_id {
            return Err(AppError::UnsupportedToken {
                chain_id: self.chain.chain_id,
                token: token.address,
            });
        }
        Ok(())
    }

    /// Resolve a registry symbol, `native`, or an address.
    ///
    /// Addresses missing from the registry are described from on-chain ERC20 metadata.
    pub async fn resolve_token(&self, input: &str) -> Result<Token> {
        let input = input.trim();
        let chain_id = self.chain.chain_id;

        if input.starts_with("0x") || input.starts_with("0X") {
            let address: Address = input
                .parse()
                .map_err(|e| AppError::InvalidAddress(format!("'{}': {}", input, e)))?;

            if address == NATIVE_TOKEN_ADDRESS {
                return Ok(self.chain.native_token());
            }
            if let Some(token) = self.registry.token_by_address(chain_id, address) {
                return Ok(token.clone());
            }

            let metadata = self.reader()?.token_metadata(address).await.map_err(|e| {
                tracing::warn!(
                    chain_id,
                    token = %address,
                    error = %e,
                    "Token metadata unavailable"
                );
                AppError::UnsupportedToken { chain_id, token: address }
            })?;
            return Ok(Token::erc20(
                chain_id,
                address,
                metadata.symbol,
                metadata.name,
                metadata.decimals,
            ));
        }

        self.registry.token_by_symbol(chain_id, input).cloned().ok_or_else(|| {
            AppError::InvalidAddress(format!(
                "Unknown token symbol '{}' on {}",
                input, self.chain.name
            ))
        })
    }

    /// Pair contract for two tokens, in either order.
    pub async fn get_pair_address(
        &self,
        token_a: &Token,
        token_b: &Token,
    ) -> Result<Option<Address>> {
        self.ensure_on_chain(token_a)?;
        self.ensure_on_chain(token_b)?;
        Ok(self.resolver()?.get_pair_address(token_a, token_b).await)
    }

    /// Single-pair price impact of selling `amount_in` of `token_in`.
    pub async fn calculate_price_impact(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: &str,
    ) -> Result<Decimal> {
        self.ensure_on_chain(token_in)?;
        self.ensure_on_chain(token_out)?;
        self.quote_engine()?.calculate_price_impact(token_in, token_out, amount_in).await
    }

    /// Wait for a submitted swap to be mined.
    pub async fn await_confirmation(&self, tx_hash: TxHash) -> Result<SwapStatus> {
        self.executor()?.await_confirmation(tx_hash).await
    }
}

#[async_trait]
impl Dex for DexAdapter {
    fn name(&self) -> &str {
        &self.chain.dex_name
    }

    fn chain_id(&self) -> u64 {
        self.chain.chain_id
    }

    async fn get_quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: &str,
    ) -> Result<QuoteResult> {
        self.ensure_on_chain(token_in)?;
        self.ensure_on_chain(token_out)?;
        self.quote_engine()?.get_quote(token_in, token_out, amount_in).await
    }

    async fn get_swap_route(&self, token_in: &Token, token_out: &Token) -> Result<Route> {
        self.ensure_on_chain(token_in)?;
        self.ensure_on_chain(token_out)?;
        let planner = RoutePlanner::new(self.resolver()?);
        Ok(planner.get_swap_route(token_in, token_out).await)
    }

    async fn execute_swap(&self, params: &SwapParams) -> Result<TxHash> {
        let executor = self.executor()?;
        let account = self.session.require_account()?;
        executor.execute_swap(params, &account, self.prompt.as_deref()).await
    }

    async fn get_pair_info(&self, token_a: &Token, token_b: &Token) -> Result<Option<PairInfo>> {
        self.ensure_on_chain(token_a)?;
        self.ensure_on_chain(token_b)?;
        Ok(self.resolver()?.get_pair_info(token_a, token_b).await)
    }

    fn is_token_supported(&self, token: &Token) -> bool {
        token.chain_id == self.chain.chain_id && self.registry.is_listed(token)
    }
}
