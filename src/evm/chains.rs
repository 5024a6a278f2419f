//! Built-in chain and DEX deployments.

use super::constants::*;
use crate::types::{ChainConfig, NativeCurrency, NativeFunctionNames, Token};

/// Ethereum mainnet with Uniswap V2.
pub fn ethereum_mainnet() -> ChainConfig {
    let id = ETHEREUM_MAINNET_CHAIN_ID;
    ChainConfig {
        chain_id: id,
        name: "Ethereum".to_string(),
        dex_name: "Uniswap V2".to_string(),
        router: UNISWAP_V2_ROUTER,
        factory: UNISWAP_V2_FACTORY,
        wrapped_native: WETH_ADDRESS,
        native: NativeCurrency { symbol: "ETH".into(), name: "Ether".into(), decimals: 18 },
        bridge_tokens: vec![USDC_ADDRESS, USDT_ADDRESS, DAI_ADDRESS],
        native_functions: NativeFunctionNames::default(),
        tokens: vec![
            Token::erc20(id, WETH_ADDRESS, "WETH", "Wrapped Ether", 18),
            Token::erc20(id, USDC_ADDRESS, "USDC", "USD Coin", 6),
            Token::erc20(id, USDT_ADDRESS, "USDT", "Tether USD", 6),
            Token::erc20(id, DAI_ADDRESS, "DAI", "Dai Stablecoin", 18),
            Token::erc20(id, WBTC_ADDRESS, "WBTC", "Wrapped BTC", 8),
            Token::erc20(id, UNI_ADDRESS, "UNI", "Uniswap", 18),
        ],
        subgraph_url: Some(
            "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2".to_string(),
        ),
    }
}

/// BNB Smart Chain with PancakeSwap V2.
pub fn bsc_mainnet() -> ChainConfig {
    let id = BSC_MAINNET_CHAIN_ID;
    ChainConfig {
        chain_id: id,
        name: "BNB Smart Chain".to_string(),
        dex_name: "PancakeSwap V2".to_string(),
        router: PANCAKESWAP_V2_ROUTER,
        factory: PANCAKESWAP_V2_FACTORY,
        wrapped_native: WBNB_ADDRESS,
        native: NativeCurrency { symbol: "BNB".into(), name: "BNB".into(), decimals: 18 },
        bridge_tokens: vec![BSC_BUSD_ADDRESS, BSC_USDT_ADDRESS, BSC_USDC_ADDRESS],
        native_functions: NativeFunctionNames::default(),
        tokens: vec![
            Token::erc20(id, WBNB_ADDRESS, "WBNB", "Wrapped BNB", 18),
            Token::erc20(id, BSC_BUSD_ADDRESS, "BUSD", "Binance USD", 18),
            Token::erc20(id, BSC_USDT_ADDRESS, "USDT", "Tether USD", 18),
            Token::erc20(id, BSC_USDC_ADDRESS, "USDC", "USD Coin", 18),
            Token::erc20(id, CAKE_ADDRESS, "CAKE", "PancakeSwap Token", 18),
        ],
        subgraph_url: None,
    }
}

/// Avalanche C-Chain with Trader Joe.
pub fn avalanche_mainnet() -> ChainConfig {
    let id = AVALANCHE_MAINNET_CHAIN_ID;
    ChainConfig {
        chain_id: id,
        name: "Avalanche".to_string(),
        dex_name: "Trader Joe".to_string(),
        router: TRADER_JOE_ROUTER,
        factory: TRADER_JOE_FACTORY,
        wrapped_native: WAVAX_ADDRESS,
        native: NativeCurrency { symbol: "AVAX".into(), name: "Avalanche".into(), decimals: 18 },
        bridge_tokens: vec![AVALANCHE_USDC_ADDRESS, AVALANCHE_USDT_ADDRESS],
        native_functions: NativeFunctionNames {
            swap_native_in: "swapExactAVAXForTokens".to_string(),
            swap_native_out: "swapExactTokensForAVAX".to_string(),
        },
        tokens: vec![
            Token::erc20(id, WAVAX_ADDRESS, "WAVAX", "Wrapped AVAX", 18),
            Token::erc20(id, AVALANCHE_USDC_ADDRESS, "USDC", "USD Coin", 6),
            Token::erc20(id, AVALANCHE_USDT_ADDRESS, "USDT", "Tether USD", 6),
            Token::erc20(id, JOE_ADDRESS, "JOE", "JoeToken", 18),
        ],
        subgraph_url: None,
    }
}

/// All built-in deployments.
pub fn builtin_chains() -> Vec<ChainConfig> {
    vec![ethereum_mainnet(), bsc_mainnet(), avalanche_mainnet()]
}
