//! Token-related types and unit conversion.

use std::hash::{Hash, Hasher};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::evm::constants::NATIVE_TOKEN_ADDRESS;

/// A token on a specific chain.
///
/// Identity is `(chain_id, address)`. The native coin and its wrapped twin are the
/// same economic asset but distinct tokens: the native one carries the sentinel
/// address and `is_native = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Chain ID where the token exists.
    pub chain_id: u64,
    /// Contract address, or the native sentinel.
    pub address: Address,
    /// Number of decimals.
    pub decimals: u8,
    /// Token symbol (e.g., "USDC").
    pub symbol: String,
    /// Token name (e.g., "USD Coin").
    pub name: String,
    /// Logo URI.
    #[serde(default, rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    /// Whether this is the chain's native coin.
    #[serde(default)]
    pub is_native: bool,
}

impl Token {
    /// Create an ERC20 token.
    pub fn erc20(
        chain_id: u64,
        address: Address,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
            name: name.into(),
            logo_uri: None,
            is_native: false,
        }
    }

    /// Create the native coin of a chain.
    pub fn native(
        chain_id: u64,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            chain_id,
            address: NATIVE_TOKEN_ADDRESS,
            decimals,
            symbol: symbol.into(),
            name: name.into(),
            logo_uri: None,
            is_native: true,
        }
    }

    /// Attach a logo URI.
    pub fn with_logo(mut self, logo_uri: impl Into<String>) -> Self {
        self.logo_uri = Some(logo_uri.into());
        self
    }

    /// Whether this token is the chain's native coin.
    pub fn is_native(&self) -> bool {
        self.is_native || self.address == NATIVE_TOKEN_ADDRESS
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

/// Format a U256 value with decimals to a human-readable string.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value == U256::ZERO {
        return "0".to_string();
    }

    let value_str = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return value_str;
    }

    let len = value_str.len();
    if len <= decimals {
        // Value is less than 1, pad with zeros
        let zeros = decimals - len;
        let decimal_part = value_str.trim_end_matches('0');
        if decimal_part.is_empty() {
            "0".to_string()
        } else {
            format!("0.{}{}", "0".repeat(zeros), decimal_part)
        }
    } else {
        let (integer, decimal) = value_str.split_at(len - decimals);
        let decimal = decimal.trim_end_matches('0');
        if decimal.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, decimal)
        }
    }
}

/// Parse a human-readable amount string to U256 with decimals.
///
/// Fraction digits beyond `decimals` are truncated.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, String> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }

    if amount.starts_with('-') {
        return Err("Amount cannot be negative".to_string());
    }

    let decimals = decimals as usize;
    let multiplier = U256::from(10).pow(U256::from(decimals));
    let overflow = || format!("Amount too large: {}", amount);

    let (integer, fraction) = match amount.split_once('.') {
        None => (amount, ""),
        Some((_, f)) if f.contains('.') => return Err("Invalid amount format".to_string()),
        Some((i, f)) => (i, f),
    };

    if integer.is_empty() && fraction.is_empty() {
        return Err("Invalid amount format".to_string());
    }

    // `U256::from_str` also accepts radix prefixes such as `0x`.
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(integer) || !is_digits(fraction) {
        return Err("Invalid amount format".to_string());
    }

    let integer_value = if integer.is_empty() {
        U256::ZERO
    } else {
        integer.parse::<U256>().map_err(|e| format!("Invalid integer part: {}", e))?
    };

    let mut fraction = fraction.to_string();
    if fraction.len() > decimals {
        fraction.truncate(decimals);
    } else {
        fraction.push_str(&"0".repeat(decimals - fraction.len()));
    }

    let fraction_value = if fraction.is_empty() {
        U256::ZERO
    } else {
        fraction.parse::<U256>().map_err(|e| format!("Invalid fraction part: {}", e))?
    };

    integer_value
        .checked_mul(multiplier)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(overflow)
}
