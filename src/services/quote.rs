//! Quotes and price impact.

use std::sync::Arc;

use alloy::primitives::U256;
use rust_decimal::Decimal;

use super::{PairResolver, RoutePlanner};
use crate::{
    error::{AppError, Result},
    evm::{
        constants::{estimate_swap_gas, GAS_WRAP_UNWRAP},
        ChainReader,
    },
    types::{format_units, parse_units, ChainConfig, QuoteResult, Route, Token},
};

/// Fixed-point scale used for impact ratios.
const IMPACT_SCALE: u32 = 18;

/// Quotes swaps on one chain via the router's `getAmountsOut` simulation.
#[derive(Clone)]
pub struct QuoteEngine {
    chain: Arc<ChainConfig>,
    reader: Arc<dyn ChainReader>,
    resolver: PairResolver,
    planner: RoutePlanner,
}

impl QuoteEngine {
    pub fn new(chain: Arc<ChainConfig>, reader: Arc<dyn ChainReader>) -> Self {
        let resolver = PairResolver::new(chain.clone(), reader.clone());
        let planner = RoutePlanner::new(resolver.clone());
        Self { chain, reader, resolver, planner }
    }

    /// Quote selling `amount_in` (human-readable) of `token_in` for `token_out`.
    pub async fn get_quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: &str,
    ) -> Result<QuoteResult> {
        let amount_in_raw = parse_amount(amount_in, token_in.decimals)?;

        // Deposit and withdraw are lossless 1:1 conversions, not trades.
        if self.chain.is_wrap_or_unwrap(token_in, token_out) {
            return Ok(QuoteResult {
                amount_out: format_units(amount_in_raw, token_out.decimals),
                amount_out_raw: amount_in_raw.to_string(),
                price_impact: Decimal::ZERO,
                route: Route::new(vec![token_in.address, token_out.address]),
                gas_estimate: GAS_WRAP_UNWRAP,
            });
        }

        let route = self.planner.get_swap_route(token_in, token_out).await;
        if route.is_empty() {
            return Err(AppError::PairNotFound);
        }

        let amounts = self
            .reader
            .get_amounts_out(self.chain.router, amount_in_raw, route.path())
            .await
            .map_err(|e| AppError::QuoteFailed(e.to_string()))?;

        if amounts.len() != route.len() {
            return Err(AppError::QuoteFailed(format!(
                "router returned {} amounts for a {}-token route",
                amounts.len(),
                route.len()
            )));
        }

        let amount_out = amounts.last().copied().unwrap_or(U256::ZERO);
        let price_impact = self.route_price_impact(&route, &amounts).await;

        tracing::info!(
            chain_id = self.chain.chain_id,
            token_in = %token_in.symbol,
            token_out = %token_out.symbol,
            amount_in = %amount_in,
            amount_out = %amount_out,
            route = %route,
            "Quote computed"
        );

        Ok(QuoteResult {
            amount_out: format_units(amount_out, token_out.decimals),
            amount_out_raw: amount_out.to_string(),
            price_impact,
            gas_estimate: estimate_swap_gas(route.hops()),
            route,
        })
    }

    /// Impact of selling `amount_in` into the direct pair of the two tokens.
    ///
    /// Zero when the tokens share no pair.
    pub async fn calculate_price_impact(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: &str,
    ) -> Result<Decimal> {
        let amount_in_raw = parse_amount(amount_in, token_in.decimals)?;

        let Some(pair) = self.resolver.get_pair_info(token_in, token_out).await else {
            return Ok(Decimal::ZERO);
        };

        let side = self.chain.addressable(token_in);
        match pair.reserves_for(side) {
            Some((reserve_in, _)) => Ok(price_impact(amount_in_raw, reserve_in)),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Compounds per-hop impact using the simulated amount entering each hop.
    async fn route_price_impact(&self, route: &Route, amounts: &[U256]) -> Decimal {
        let mut hop_impacts = Vec::with_capacity(route.hops());

        for ((from, to), amount) in route.pairs().zip(amounts) {
            let impact = match self.resolver.pair_info(from, to).await {
                Some(pair) => match pair.reserves_for(from) {
                    Some((reserve_in, _)) => price_impact(*amount, reserve_in),
                    None => Decimal::ZERO,
                },
                None => {
                    tracing::warn!(
                        chain_id = self.chain.chain_id,
                        token_in = %from,
                        token_out = %to,
                        "Reserves unavailable, hop impact counted as zero"
                    );
                    Decimal::ZERO
                }
            };
            hop_impacts.push(impact);
        }

        compound_price_impact(&hop_impacts)
    }
}

fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let raw = parse_units(amount, decimals).map_err(AppError::InvalidAmount)?;
    if raw.is_zero() {
        return Err(AppError::InvalidAmount("Amount must be greater than zero".to_string()));
    }
    Ok(raw)
}

/// `amount_in / (reserve_in + amount_in) * 100`, as a percentage in [0, 100].
pub fn price_impact(amount_in: U256, reserve_in: U256) -> Decimal {
    if amount_in.is_zero() {
        return Decimal::ZERO;
    }

    let mut numerator = amount_in;
    let mut denominator = reserve_in.saturating_add(amount_in);
    let scale = U256::from(100u64) * U256::from(10u64).pow(U256::from(IMPACT_SCALE));

    // Drop low bits until the scaled numerator fits; only reachable for absurd amounts.
    while numerator.checked_mul(scale).is_none() {
        numerator >>= 64;
        denominator >>= 64;
    }
    if denominator.is_zero() {
        return Decimal::ONE_HUNDRED;
    }

    let scaled = numerator * scale / denominator;
    let scaled = u128::try_from(scaled).unwrap_or(u128::MAX).min(100 * 10u128.pow(IMPACT_SCALE));

    Decimal::from_i128_with_scale(scaled as i128, IMPACT_SCALE).normalize()
}

/// Total impact of consecutive hops: `1 - prod(1 - impact_i)`, as a percentage.
pub fn compound_price_impact(hop_impacts: &[Decimal]) -> Decimal {
    let remaining = hop_impacts.iter().fold(Decimal::ONE, |acc, impact| {
        let kept = Decimal::ONE - (*impact / Decimal::ONE_HUNDRED);
        acc * kept.max(Decimal::ZERO)
    });

    ((Decimal::ONE - remaining) * Decimal::ONE_HUNDRED)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .normalize()
}
