//! Route, quote and swap types.

use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::{format_units, parse_units, Token};
use crate::error::{AppError, Result};

/// Get current Unix timestamp in seconds.
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp() -> u64 {
    SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Ordered token addresses a swap passes through.
///
/// An empty route means no liquidity path was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<Address>);

impl Route {
    pub fn new(path: Vec<Address>) -> Self {
        Self(path)
    }

    /// The "no path" route.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Number of pairs traversed.
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn path(&self) -> &[Address] {
        &self.0
    }

    pub fn first(&self) -> Option<Address> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<Address> {
        self.0.last().copied()
    }

    /// Consecutive `(from, to)` pairs of the route.
    pub fn pairs(&self) -> impl Iterator<Item = (Address, Address)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn into_inner(self) -> Vec<Address> {
        self.0
    }
}

impl From<Vec<Address>> for Route {
    fn from(path: Vec<Address>) -> Self {
        Self(path)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|a| format!("{a:?}")).collect();
        write!(f, "[{}]", parts.join(" -> "))
    }
}

/// Snapshot of one AMM pair's on-chain state.
///
/// `token0`/`token1` follow the factory's ordering, not the caller's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    pub token0: Address,
    pub token1: Address,
    pub pair_address: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_supply: U256,
}

impl PairInfo {
    /// `(reserve_in, reserve_out)` for a trade selling `token_in`, or `None` if the
    /// token is not part of this pair.
    pub fn reserves_for(&self, token_in: Address) -> Option<(U256, U256)> {
        if token_in == self.token0 {
            Some((self.reserve0, self.reserve1))
        } else if token_in == self.token1 {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }
}

/// Point-in-time quote. Never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    /// Expected output (human-readable, output token decimals).
    pub amount_out: String,
    /// Expected output in base units.
    pub amount_out_raw: String,
    /// Price impact as a percentage in [0, 100].
    pub price_impact: Decimal,
    pub route: Route,
    pub gas_estimate: u64,
}

/// Parameters for one swap attempt, consumed by the executor.
#[derive(Debug, Clone)]
pub struct SwapParams {
    pub token_in: Token,
    pub token_out: Token,
    /// Human-readable input amount.
    pub amount_in: String,
    /// Human-readable minimum output.
    pub amount_out_min: String,
    /// Defaults to the signing account.
    pub recipient: Option<Address>,
    /// Absolute Unix timestamp.
    pub deadline: u64,
    /// Percentage (e.g., 0.5 for 0.5%).
    pub slippage_tolerance: Decimal,
    /// Precomputed route; resolved again when empty.
    pub route: Route,
}

impl SwapParams {
    /// Build swap parameters from a fresh quote, re-applying slippage to its output.
    pub fn from_quote(
        token_in: Token,
        token_out: Token,
        amount_in: &str,
        quote: &QuoteResult,
        slippage_tolerance: Decimal,
        deadline_minutes: u64,
    ) -> Result<Self> {
        let amount_out = parse_units(&quote.amount_out, token_out.decimals)
            .map_err(AppError::InvalidAmount)?;
        let min_out = apply_slippage(amount_out, slippage_tolerance)?;

        Ok(Self {
            amount_in: amount_in.trim().to_string(),
            amount_out_min: format_units(min_out, token_out.decimals),
            recipient: None,
            deadline: deadline_from_now(deadline_minutes),
            slippage_tolerance,
            route: quote.route.clone(),
            token_in,
            token_out,
        })
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }
}

/// Absolute deadline `minutes` from now.
pub fn deadline_from_now(minutes: u64) -> u64 {
    current_timestamp() + minutes.saturating_mul(60)
}

/// Minimum acceptable output after a slippage percentage, truncated to base units.
pub fn apply_slippage(amount: U256, slippage_tolerance: Decimal) -> Result<U256> {
    if slippage_tolerance < Decimal::ZERO || slippage_tolerance > Decimal::from(100) {
        return Err(AppError::InvalidAmount(format!(
            "slippage tolerance {} is outside 0-100%",
            slippage_tolerance
        )));
    }

    // Parts per million of `amount` that must be received.
    let keep_ppm =
        decimal_to_u128((Decimal::from(100) - slippage_tolerance) * Decimal::from(10_000))?;

    amount
        .checked_mul(U256::from(keep_ppm))
        .map(|v| v / U256::from(1_000_000u64))
        .ok_or_else(|| {
            AppError::NumericOverflow(format!("amount {} too large for slippage", amount))
        })
}

/// Convert a Decimal to u128 with overflow checking.
/// Truncates to integer and validates it fits in u128.
pub fn decimal_to_u128(value: Decimal) -> Result<u128> {
    value
        .trunc()
        .to_string()
        .parse::<u128>()
        .map_err(|_| AppError::NumericOverflow(format!("Decimal {} exceeds u128 range", value)))
}

/// Progress of a swap attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SwapStatus {
    Idle,
    Approving,
    Executing,
    /// Transaction accepted by the node; not yet mined.
    Submitted(TxHash),
    Confirmed(TxHash),
    Failed(String),
    /// Credential prompt dismissed; nothing was sent.
    Aborted,
}

impl SwapStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapStatus::Confirmed(_) | SwapStatus::Failed(_) | SwapStatus::Aborted)
    }
}
