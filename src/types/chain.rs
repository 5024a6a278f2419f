//! Per-chain DEX configuration.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::Token;

/// Native currency description for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// Router entry-point names for swaps touching the native coin.
///
/// Forks rename these (`swapExactAVAXForTokens` on Trader Joe, for example) while
/// keeping the argument layout of Uniswap V2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeFunctionNames {
    /// `(uint256 amountOutMin, address[] path, address to, uint256 deadline)`, payable.
    pub swap_native_in: String,
    /// `(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline)`.
    pub swap_native_out: String,
}

impl Default for NativeFunctionNames {
    fn default() -> Self {
        Self {
            swap_native_in: "swapExactETHForTokens".to_string(),
            swap_native_out: "swapExactTokensForETH".to_string(),
        }
    }
}

/// Everything the shared routing, quoting and execution code needs to know about one
/// chain and its AMM deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Chain display name (e.g., "Ethereum").
    pub name: String,
    /// DEX protocol name (e.g., "Uniswap V2").
    pub dex_name: String,
    pub router: Address,
    pub factory: Address,
    pub wrapped_native: Address,
    pub native: NativeCurrency,
    /// Ordered bridge candidates tried after the wrapped native token.
    #[serde(default)]
    pub bridge_tokens: Vec<Address>,
    #[serde(default)]
    pub native_functions: NativeFunctionNames,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgraph_url: Option<String>,
}

impl ChainConfig {
    /// The chain's native coin as a token.
    pub fn native_token(&self) -> Token {
        Token::native(
            self.chain_id,
            self.native.symbol.clone(),
            self.native.name.clone(),
            self.native.decimals,
        )
    }

    /// Address used when talking to contracts: native maps to wrapped native.
    pub fn addressable(&self, token: &Token) -> Address {
        if token.is_native() {
            self.wrapped_native
        } else {
            token.address
        }
    }

    /// Native coin into its wrapped twin.
    pub fn is_wrap(&self, token_in: &Token, token_out: &Token) -> bool {
        token_in.is_native() && !token_out.is_native() && token_out.address == self.wrapped_native
    }

    /// Wrapped twin back into the native coin.
    pub fn is_unwrap(&self, token_in: &Token, token_out: &Token) -> bool {
        token_out.is_native() && !token_in.is_native() && token_in.address == self.wrapped_native
    }

    pub fn is_wrap_or_unwrap(&self, token_in: &Token, token_out: &Token) -> bool {
        self.is_wrap(token_in, token_out) || self.is_unwrap(token_in, token_out)
    }

    /// Intermediate tokens in the order routing tries them: wrapped native first,
    /// then the configured bridges, without duplicates.
    pub fn bridge_priority(&self) -> Vec<Address> {
        let mut candidates = vec![self.wrapped_native];
        for bridge in &self.bridge_tokens {
            if !candidates.contains(bridge) {
                candidates.push(*bridge);
            }
        }
        candidates
    }
}
