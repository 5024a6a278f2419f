//! Swap execution.
//!
//! Builds and submits the router call (or the wrapped-native deposit/withdraw) for a
//! [`SwapParams`]. Transactions are never resubmitted: any failure is reported once through
//! the status channel and returned to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::{
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use tokio::sync::watch;

use super::{PairResolver, RoutePlanner};
use crate::{
    error::{AppError, Result},
    evm::{
        contracts::{
            erc20::IERC20,
            uniswap_v2::{encode_swap_native_in, encode_swap_native_out, IUniswapV2Router02},
            weth::IWrappedNative,
        },
        Account, ChainReader, ChainWriter, CredentialPrompt,
    },
    types::{current_timestamp, parse_units, ChainConfig, Route, SwapParams, SwapStatus},
};

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Default time to wait for a receipt.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(180);

/// Router entry point chosen for a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapVariant {
    /// Wrapped-native `deposit`.
    Wrap,
    /// Wrapped-native `withdraw`.
    Unwrap,
    NativeForTokens,
    TokensForNative,
    TokensForTokens,
}

/// Executes swaps on one chain.
#[derive(Clone)]
pub struct SwapExecutor {
    chain: Arc<ChainConfig>,
    reader: Arc<dyn ChainReader>,
    writer: Arc<dyn ChainWriter>,
    planner: RoutePlanner,
    status: Arc<watch::Sender<SwapStatus>>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl SwapExecutor {
    pub fn new(
        chain: Arc<ChainConfig>,
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
    ) -> Self {
        let planner = RoutePlanner::new(PairResolver::new(chain.clone(), reader.clone()));
        let (status, _) = watch::channel(SwapStatus::Idle);
        Self {
            chain,
            reader,
            writer,
            planner,
            status: Arc::new(status),
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    /// Share a status channel owned by the caller.
    pub fn with_status_channel(mut self, status: Arc<watch::Sender<SwapStatus>>) -> Self {
        self.status = status;
        self
    }

    pub fn with_polling(mut self, poll_interval: Duration, confirmation_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.confirmation_timeout = confirmation_timeout;
        self
    }

    /// Watch swap progress.
    pub fn subscribe(&self) -> watch::Receiver<SwapStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SwapStatus {
        self.status.borrow().clone()
    }

    fn set_status(&self, status: SwapStatus) {
        tracing::debug!(chain_id = self.chain.chain_id, status = ?status, "Swap status");
        self.status.send_replace(status);
    }

    /// Pick the on-chain entry point for a token pair.
    pub fn variant(&self, params: &SwapParams) -> SwapVariant {
        let (token_in, token_out) = (&params.token_in, &params.token_out);
        if self.chain.is_wrap(token_in, token_out) {
            SwapVariant::Wrap
        } else if self.chain.is_unwrap(token_in, token_out) {
            SwapVariant::Unwrap
        } else if token_in.is_native() {
            SwapVariant::NativeForTokens
        } else if token_out.is_native() {
            SwapVariant::TokensForNative
        } else {
            SwapVariant::TokensForTokens
        }
    }

    /// Submit the swap described by `params` and return its transaction hash.
    ///
    /// Custodial accounts ask `prompt` for their secret first; a dismissed prompt ends in
    /// [`SwapStatus::Aborted`] with nothing submitted. Confirmation is left to
    /// [`SwapExecutor::await_confirmation`].
    pub async fn execute_swap(
        &self,
        params: &SwapParams,
        account: &Account,
        prompt: Option<&dyn CredentialPrompt>,
    ) -> Result<TxHash> {
        self.set_status(SwapStatus::Idle);

        match self.run(params, account, prompt).await {
            Ok(tx_hash) => {
                self.set_status(SwapStatus::Submitted(tx_hash));
                Ok(tx_hash)
            }
            Err(AppError::Aborted) => {
                tracing::info!(chain_id = self.chain.chain_id, "Swap aborted by user");
                self.set_status(SwapStatus::Aborted);
                Err(AppError::Aborted)
            }
            Err(e) => {
                tracing::warn!(chain_id = self.chain.chain_id, error = %e, "Swap failed");
                self.set_status(SwapStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        params: &SwapParams,
        account: &Account,
        prompt: Option<&dyn CredentialPrompt>,
    ) -> Result<TxHash> {
        self.validate(params)?;

        let amount_in = parse_units(&params.amount_in, params.token_in.decimals)
            .map_err(AppError::InvalidAmount)?;
        if amount_in.is_zero() {
            return Err(AppError::InvalidAmount("Amount must be greater than zero".to_string()));
        }

        let variant = self.variant(params);
        tracing::info!(
            chain_id = self.chain.chain_id,
            token_in = %params.token_in.symbol,
            token_out = %params.token_out.symbol,
            amount_in = %params.amount_in,
            variant = ?variant,
            "Executing swap"
        );

        match variant {
            SwapVariant::Wrap => {
                let signer = account.signer(prompt).await?;
                self.set_status(SwapStatus::Executing);
                let tx = TransactionRequest::default()
                    .to(self.chain.wrapped_native)
                    .input(Bytes::from(IWrappedNative::depositCall {}.abi_encode()).into())
                    .value(amount_in)
                    .from(signer.address());
                self.submit(&signer, tx).await
            }
            SwapVariant::Unwrap => {
                // withdraw burns the caller's own balance; no allowance involved.
                let signer = account.signer(prompt).await?;
                self.set_status(SwapStatus::Executing);
                let calldata = IWrappedNative::withdrawCall { wad: amount_in }.abi_encode();
                let tx = TransactionRequest::default()
                    .to(self.chain.wrapped_native)
                    .input(Bytes::from(calldata).into())
                    .from(signer.address());
                self.submit(&signer, tx).await
            }
            _ => self.swap_via_router(params, variant, amount_in, account, prompt).await,
        }
    }

    async fn swap_via_router(
        &self,
        params: &SwapParams,
        variant: SwapVariant,
        amount_in: U256,
        account: &Account,
        prompt: Option<&dyn CredentialPrompt>,
    ) -> Result<TxHash> {
        let route = self.resolve_route(params).await?;

        let amount_out_min = parse_units(&params.amount_out_min, params.token_out.decimals)
            .map_err(AppError::InvalidAmount)?;

        if params.deadline <= current_timestamp() {
            return Err(AppError::SwapFailed(format!(
                "deadline {} has already passed",
                params.deadline
            )));
        }
        let deadline = U256::from(params.deadline);

        let signer = account.signer(prompt).await?;
        let owner = signer.address();
        let recipient = params.recipient.unwrap_or(owner);

        if variant != SwapVariant::NativeForTokens {
            self.ensure_allowance(&signer, params.token_in.address, amount_in).await?;
        }

        self.set_status(SwapStatus::Executing);

        let path = route.into_inner();
        let names = &self.chain.native_functions;
        let (calldata, value) = match variant {
            SwapVariant::NativeForTokens => (
                encode_swap_native_in(
                    &names.swap_native_in,
                    amount_out_min,
                    path,
                    recipient,
                    deadline,
                ),
                Some(amount_in),
            ),
            SwapVariant::TokensForNative => (
                encode_swap_native_out(
                    &names.swap_native_out,
                    amount_in,
                    amount_out_min,
                    path,
                    recipient,
                    deadline,
                ),
                None,
            ),
            _ => (
                Bytes::from(
                    IUniswapV2Router02::swapExactTokensForTokensCall {
                        amountIn: amount_in,
                        amountOutMin: amount_out_min,
                        path,
                        to: recipient,
                        deadline,
                    }
                    .abi_encode(),
                ),
                None,
            ),
        };

        let mut tx =
            TransactionRequest::default().to(self.chain.router).input(calldata.into()).from(owner);
        if let Some(value) = value {
            tx = tx.value(value);
        }

        self.submit(&signer, tx).await
    }

    fn validate(&self, params: &SwapParams) -> Result<()> {
        for token in [&params.token_in, &params.token_out] {
            if token.chain_id != self.chain.chain_id {
                return Err(AppError::UnsupportedToken {
                    chain_id: self.chain.chain_id,
                    token: token.address,
                });
            }
        }
        if params.token_in == params.token_out {
            return Err(AppError::InvalidAddress(
                "token_in and token_out must be different".to_string(),
            ));
        }
        Ok(())
    }

    /// Use the precomputed route when it connects the tokens, otherwise plan one.
    async fn resolve_route(&self, params: &SwapParams) -> Result<Route> {
        let from = self.chain.addressable(&params.token_in);
        let to = self.chain.addressable(&params.token_out);

        if !params.route.is_empty() {
            if params.route.first() == Some(from) && params.route.last() == Some(to) {
                return Ok(params.route.clone());
            }
            return Err(AppError::SwapFailed(format!(
                "route {} does not connect {} to {}",
                params.route, from, to
            )));
        }

        let route = self.planner.plan(from, to).await;
        if route.is_empty() {
            return Err(AppError::PairNotFound);
        }
        Ok(route)
    }

    /// Approve the router for `amount` of `token` when the current allowance is short,
    /// waiting for the approval to be mined.
    ///
    /// A non-zero allowance is reset to zero first: tokens such as USDT revert when one
    /// non-zero allowance is changed to another.
    async fn ensure_allowance(
        &self,
        signer: &PrivateKeySigner,
        token: Address,
        amount: U256,
    ) -> Result<()> {
        let owner = signer.address();
        let allowance = self.reader.allowance(token, owner, self.chain.router).await?;
        if allowance >= amount {
            return Ok(());
        }

        self.set_status(SwapStatus::Approving);
        tracing::info!(
            chain_id = self.chain.chain_id,
            token = %token,
            spender = %self.chain.router,
            current = %allowance,
            amount = %amount,
            "Approving router"
        );

        if !allowance.is_zero() {
            self.approve(signer, token, U256::ZERO).await?;
        }
        self.approve(signer, token, amount).await
    }

    /// Send one `approve` and wait for it to be mined.
    ///
    /// The approval is already broadcast once this waits, so every failure here is final.
    async fn approve(&self, signer: &PrivateKeySigner, token: Address, amount: U256) -> Result<()> {
        let calldata = IERC20::approveCall { spender: self.chain.router, amount }.abi_encode();
        let tx = TransactionRequest::default()
            .to(token)
            .input(Bytes::from(calldata).into())
            .from(signer.address());
        let approve_hash = self.submit(signer, tx).await?;

        let mined = self.wait_for_receipt(approve_hash).await.map_err(|e| {
            AppError::SwapFailed(format!("approval {} unconfirmed: {}", approve_hash, e))
        })?;
        if !mined {
            return Err(AppError::SwapFailed(format!("approval {} reverted", approve_hash)));
        }
        Ok(())
    }

    async fn submit(&self, signer: &PrivateKeySigner, tx: TransactionRequest) -> Result<TxHash> {
        self.writer.send_transaction(signer, tx).await.map_err(|e| match e {
            AppError::SwapFailed(_) => e,
            other => AppError::SwapFailed(other.to_string()),
        })
    }

    /// Poll for a receipt until it is mined: `true` when it succeeded.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<bool> {
        let start = Instant::now();
        loop {
            if start.elapsed() > self.confirmation_timeout {
                return Err(AppError::Transport(format!(
                    "timed out waiting for receipt of {}",
                    tx_hash
                )));
            }
            match self.reader.transaction_status(tx_hash).await {
                Ok(Some(success)) => return Ok(success),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(tx_hash = %tx_hash, error = %e, "Receipt poll failed");
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Wait for a submitted swap to be mined and publish the outcome.
    pub async fn await_confirmation(&self, tx_hash: TxHash) -> Result<SwapStatus> {
        let status = if self.wait_for_receipt(tx_hash).await? {
            SwapStatus::Confirmed(tx_hash)
        } else {
            SwapStatus::Failed(format!("transaction {} reverted", tx_hash))
        };
        tracing::info!(
            chain_id = self.chain.chain_id,
            tx_hash = %tx_hash,
            status = ?status,
            "Swap settled"
        );
        self.set_status(status.clone());
        Ok(status)
    }
}
