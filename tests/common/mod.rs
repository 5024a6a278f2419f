//! Common utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::{
    primitives::{keccak256, Address, Bytes, TxHash, U256},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use async_trait::async_trait;

use multichain_dex::{
    evm::{
        contracts::erc20::{TokenMetadata, IERC20},
        PairState,
    },
    types::{ChainConfig, NativeCurrency, NativeFunctionNames, Token},
    Account, AppError, ChainReader, ChainRegistry, ChainWriter, Config, DexAdapter,
    MultichainDexServer, Result, WalletSession,
};

// ============================================================================
// Synthetic chain
// ============================================================================

pub const CHAIN_ID: u64 = 31337;

pub const ROUTER: Address = Address::repeat_byte(0x01);
pub const FACTORY: Address = Address::repeat_byte(0x02);
pub const WRAPPED: Address = Address::repeat_byte(0x10);
/// First bridge stablecoin (6 decimals).
pub const USD: Address = Address::repeat_byte(0x20);
/// Second bridge stablecoin (18 decimals).
pub const DAI: Address = Address::repeat_byte(0x21);
pub const TKA: Address = Address::repeat_byte(0xa1);
pub const TKB: Address = Address::repeat_byte(0xb1);
/// 8 decimals.
pub const TKC: Address = Address::repeat_byte(0xc1);

/// Hardhat/Foundry account #0. DO NOT use in production!
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// `n` whole units of a token with `decimals`.
pub fn units(n: u64, decimals: u8) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(decimals))
}

pub fn test_chain() -> ChainConfig {
    ChainConfig {
        chain_id: CHAIN_ID,
        name: "Testnet".to_string(),
        dex_name: "Test Swap".to_string(),
        router: ROUTER,
        factory: FACTORY,
        wrapped_native: WRAPPED,
        native: NativeCurrency { symbol: "TEST".into(), name: "Test Coin".into(), decimals: 18 },
        bridge_tokens: vec![USD, DAI],
        native_functions: NativeFunctionNames {
            swap_native_in: "swapExactAVAXForTokens".to_string(),
            swap_native_out: "swapExactTokensForAVAX".to_string(),
        },
        tokens: vec![
            Token::erc20(CHAIN_ID, WRAPPED, "WTEST", "Wrapped Test Coin", 18),
            Token::erc20(CHAIN_ID, USD, "USD", "Test Dollar", 6),
            Token::erc20(CHAIN_ID, DAI, "DAI", "Test Dai", 18),
            Token::erc20(CHAIN_ID, TKA, "TKA", "Token A", 18),
            Token::erc20(CHAIN_ID, TKB, "TKB", "Token B", 18),
            Token::erc20(CHAIN_ID, TKC, "TKC", "Token C", 8),
        ],
        subgraph_url: None,
    }
}

pub fn test_registry() -> Arc<ChainRegistry> {
    Arc::new(ChainRegistry::new(vec![test_chain()]).unwrap())
}

pub fn token(registry: &ChainRegistry, symbol: &str) -> Token {
    registry.token_by_symbol(CHAIN_ID, symbol).cloned().unwrap()
}

pub fn native() -> Token {
    test_chain().native_token()
}

pub fn test_account() -> Account {
    Account::from_private_key(TEST_PRIVATE_KEY).unwrap()
}

/// Adapter over `mock` for reads only.
pub fn read_adapter(mock: &Arc<MockChain>) -> DexAdapter {
    DexAdapter::new(test_registry(), CHAIN_ID).unwrap().with_reader(mock.clone())
}

/// Adapter over `mock` for reads and writes, with the test account connected.
pub fn trading_adapter(mock: &Arc<MockChain>) -> DexAdapter {
    read_adapter(mock)
        .with_writer(mock.clone())
        .with_session(WalletSession::with_account(test_account()))
        .with_polling(std::time::Duration::from_millis(1), std::time::Duration::from_secs(2))
}

// ============================================================================
// In-memory chain
// ============================================================================

/// A transaction received by [`MockChain`].
#[derive(Debug, Clone)]
pub struct SentTx {
    pub from: Address,
    pub to: Address,
    pub input: Bytes,
    pub value: Option<U256>,
    pub hash: TxHash,
}

impl SentTx {
    pub fn selector(&self) -> [u8; 4] {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&self.input[..4]);
        selector
    }
}

#[derive(Default)]
struct MockState {
    /// Pair addresses keyed by the sorted token pair.
    pairs: HashMap<(Address, Address), Address>,
    pools: HashMap<Address, PairState>,
    allowances: HashMap<(Address, Address, Address), U256>,
    metadata: HashMap<Address, TokenMetadata>,
    receipts: HashMap<TxHash, bool>,
    sent: Vec<SentTx>,
    pair_lookups: usize,
    fail_pair_lookups: bool,
    fail_amounts_out: bool,
    revert_approvals: bool,
    strict_approvals: bool,
    withhold_receipts: bool,
    reject_sends: Option<String>,
}

/// Uniswap V2 factory, pairs and router (0.3% fee) held in memory.
#[derive(Default)]
pub struct MockChain {
    state: Mutex<MockState>,
}

fn sorted(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Constant-product output with the 0.3% fee, as `UniswapV2Library.getAmountOut`.
pub fn amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> U256 {
    let amount_in_with_fee = amount_in * U256::from(997u64);
    let numerator = amount_in_with_fee * reserve_out;
    let denominator = reserve_in * U256::from(1000u64) + amount_in_with_fee;
    numerator / denominator
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a pair holding `reserve_a` of `a` and `reserve_b` of `b`.
    pub fn add_pair(&self, a: Address, b: Address, reserve_a: U256, reserve_b: U256) -> Address {
        let mut state = self.state.lock().unwrap();
        let (token0, token1) = sorted(a, b);
        let (reserve0, reserve1) =
            if token0 == a { (reserve_a, reserve_b) } else { (reserve_b, reserve_a) };

        let salt = keccak256([token0.as_slice(), token1.as_slice()].concat());
        let pair = Address::from_slice(&salt[12..]);
        state.pairs.insert((token0, token1), pair);
        let total_supply = U256::from(1_000_000u64);
        state.pools.insert(pair, PairState { token0, token1, reserve0, reserve1, total_supply });
        pair
    }

    pub fn add_metadata(&self, address: Address, symbol: &str, decimals: u8) {
        self.state.lock().unwrap().metadata.insert(
            address,
            TokenMetadata {
                address,
                name: format!("{symbol} Token"),
                symbol: symbol.to_string(),
                decimals,
            },
        );
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state.lock().unwrap().allowances.insert((token, owner, spender), amount);
    }

    pub fn fail_pair_lookups(&self) {
        self.state.lock().unwrap().fail_pair_lookups = true;
    }

    pub fn fail_amounts_out(&self) {
        self.state.lock().unwrap().fail_amounts_out = true;
    }

    pub fn revert_approvals(&self) {
        self.state.lock().unwrap().revert_approvals = true;
    }

    /// Revert approvals that change one non-zero allowance to another, as USDT does.
    pub fn strict_approvals(&self) {
        self.state.lock().unwrap().strict_approvals = true;
    }

    /// Accept transactions but never mine them.
    pub fn withhold_receipts(&self) {
        self.state.lock().unwrap().withhold_receipts = true;
    }

    pub fn reject_sends(&self, reason: &str) {
        self.state.lock().unwrap().reject_sends = Some(reason.to_string());
    }

    /// Mark a transaction as mined.
    pub fn set_receipt(&self, tx_hash: TxHash, success: bool) {
        self.state.lock().unwrap().receipts.insert(tx_hash, success);
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn pair_lookups(&self) -> usize {
        self.state.lock().unwrap().pair_lookups
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        let mut state = self.state.lock().unwrap();
        state.pair_lookups += 1;
        if state.fail_pair_lookups {
            return Err(AppError::Rpc("connection refused".to_string()));
        }
        if factory != FACTORY {
            return Ok(Address::ZERO);
        }
        Ok(state.pairs.get(&sorted(token_a, token_b)).copied().unwrap_or(Address::ZERO))
    }

    async fn get_pair_state(&self, pair: Address) -> Result<PairState> {
        let state = self.state.lock().unwrap();
        state
            .pools
            .get(&pair)
            .cloned()
            .ok_or_else(|| AppError::Rpc("execution reverted".to_string()))
    }

    async fn get_amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        let state = self.state.lock().unwrap();
        if state.fail_amounts_out || router != ROUTER {
            return Err(AppError::Rpc("request timed out".to_string()));
        }

        let mut amounts = vec![amount_in];
        for hop in path.windows(2) {
            let pair = state
                .pairs
                .get(&sorted(hop[0], hop[1]))
                .ok_or_else(|| AppError::Rpc("UniswapV2Library: INVALID_PATH".to_string()))?;
            let pool = &state.pools[pair];
            let (reserve_in, reserve_out) = if hop[0] == pool.token0 {
                (pool.reserve0, pool.reserve1)
            } else {
                (pool.reserve1, pool.reserve0)
            };
            let last = amounts[amounts.len() - 1];
            amounts.push(amount_out(last, reserve_in, reserve_out));
        }
        Ok(amounts)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let state = self.state.lock().unwrap();
        Ok(state.allowances.get(&(token, owner, spender)).copied().unwrap_or(U256::ZERO))
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata> {
        let state = self.state.lock().unwrap();
        state
            .metadata
            .get(&token)
            .cloned()
            .ok_or_else(|| AppError::Rpc("execution reverted".to_string()))
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> Result<Option<bool>> {
        Ok(self.state.lock().unwrap().receipts.get(&tx_hash).copied())
    }
}

#[async_trait]
impl ChainWriter for MockChain {
    async fn send_transaction(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.reject_sends {
            return Err(AppError::Rpc(reason.clone()));
        }

        let from = signer.address();
        let to = tx.to.and_then(|kind| kind.to().copied()).unwrap_or_default();
        let input = tx.input.input().cloned().unwrap_or_default();
        let hash = keccak256((state.sent.len() as u64).to_be_bytes());

        let mut success = true;
        if input.len() >= 4 && input[..4] == IERC20::approveCall::SELECTOR {
            let call = IERC20::approveCall::abi_decode(&input)
                .map_err(|e| AppError::Parse(e.to_string()))?;
            let current = state.allowances.get(&(to, from, call.spender)).copied();
            let resets_non_zero = !call.amount.is_zero() && current.is_some_and(|a| !a.is_zero());
            if state.revert_approvals || (state.strict_approvals && resets_non_zero) {
                success = false;
            } else {
                state.allowances.insert((to, from, call.spender), call.amount);
            }
        }

        if !state.withhold_receipts {
            state.receipts.insert(hash, success);
        }
        state.sent.push(SentTx { from, to, input, value: tx.value, hash });
        Ok(hash)
    }
}

// ============================================================================
// Live server (network tests)
// ============================================================================

/// Helper to create a server from environment variables.
pub async fn create_test_server() -> Option<MultichainDexServer> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let rpc_url = std::env::var("ETHEREUM_RPC_URL").ok().filter(|url| !url.is_empty())?;

    let vars = HashMap::from([("ETHEREUM_RPC_URL".to_string(), rpc_url)]);
    let config = Config::from_lookup(&vars).ok()?;
    let registry = Arc::new(ChainRegistry::from_config(&config).await.ok()?);

    MultichainDexServer::new(config, registry).ok()
}

/// Skip test if server cannot be created (missing env vars).
#[macro_export]
macro_rules! skip_if_no_server {
    () => {
        match common::create_test_server().await {
            Some(server) => server,
            None => {
                eprintln!("Skipping test: ETHEREUM_RPC_URL not set");
                return;
            }
        }
    };
}
