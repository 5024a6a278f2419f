//! EVM network constants.
//!
//! Contains chain IDs and mainnet contract addresses for the built-in DEX deployments.

use alloy::primitives::{address, Address};

/// Sentinel address standing in for a chain's native coin.
pub const NATIVE_TOKEN_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

// ============================================================================
// Chain IDs
// ============================================================================

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET_CHAIN_ID: u64 = 1;

/// BNB Smart Chain chain ID.
pub const BSC_MAINNET_CHAIN_ID: u64 = 56;

/// Avalanche C-Chain chain ID.
pub const AVALANCHE_MAINNET_CHAIN_ID: u64 = 43114;

// ============================================================================
// Ethereum Mainnet (Uniswap V2)
// ============================================================================

/// Uniswap V2 Router address on Ethereum Mainnet.
pub const UNISWAP_V2_ROUTER: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");

/// Uniswap V2 Factory address on Ethereum Mainnet.
pub const UNISWAP_V2_FACTORY: Address = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");

/// Wrapped Ether (WETH) address on Ethereum Mainnet.
pub const WETH_ADDRESS: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// USDC address on Ethereum Mainnet.
pub const USDC_ADDRESS: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// USDT address on Ethereum Mainnet.
pub const USDT_ADDRESS: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");

/// DAI address on Ethereum Mainnet.
pub const DAI_ADDRESS: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");

/// WBTC address on Ethereum Mainnet.
pub const WBTC_ADDRESS: Address = address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599");

/// UNI token address on Ethereum Mainnet.
pub const UNI_ADDRESS: Address = address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984");

// ============================================================================
// BNB Smart Chain (PancakeSwap V2)
// ============================================================================

pub const PANCAKESWAP_V2_ROUTER: Address = address!("10ED43C718714eb63d5aA57B78B54704E256024E");
pub const PANCAKESWAP_V2_FACTORY: Address = address!("cA143Ce32Fe78f1f7019d7d551a6402fC5350c73");
pub const WBNB_ADDRESS: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");
pub const BSC_BUSD_ADDRESS: Address = address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56");
/// Binance-peg USDT (18 decimals on BSC).
pub const BSC_USDT_ADDRESS: Address = address!("55d398326f99059fF775485246999027B3197955");
/// Binance-peg USDC (18 decimals on BSC).
pub const BSC_USDC_ADDRESS: Address = address!("8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d");
pub const CAKE_ADDRESS: Address = address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82");

// ============================================================================
// Avalanche C-Chain (Trader Joe)
// ============================================================================

pub const TRADER_JOE_ROUTER: Address = address!("60aE616a2155Ee3d9A68541Ba4544862310933d4");
pub const TRADER_JOE_FACTORY: Address = address!("9Ad6C38BE94206cA50bb0d90783181662f0Cfa10");
pub const WAVAX_ADDRESS: Address = address!("B31f66AA3C1e785363F0875A1B74E27b85FD66c7");
pub const AVALANCHE_USDC_ADDRESS: Address = address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E");
pub const AVALANCHE_USDT_ADDRESS: Address = address!("9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7");
pub const JOE_ADDRESS: Address = address!("6e84a6216eA6dACC71eE8E6b0a5B7322EEbC0fDd");

// ============================================================================
// Gas estimates
// ============================================================================

/// Gas for a WETH9-style deposit or withdraw.
pub const GAS_WRAP_UNWRAP: u64 = 50_000;

/// Gas for a single-hop router swap.
pub const GAS_SWAP_SINGLE_HOP: u64 = 130_000;

/// Extra gas per additional hop.
pub const GAS_SWAP_EXTRA_HOP: u64 = 60_000;

/// Static gas estimate for a route of `hops` pairs.
pub fn estimate_swap_gas(hops: usize) -> u64 {
    let extra = hops.saturating_sub(1) as u64;
    GAS_SWAP_SINGLE_HOP + extra * GAS_SWAP_EXTRA_HOP
}
