//! Integration tests for quoting and price impact.
//!
//! Run with: `cargo test --test test_quote`

mod common;

use alloy::primitives::U256;
use common::*;
use multichain_dex::{
    evm::constants::{estimate_swap_gas, GAS_WRAP_UNWRAP},
    services::{compound_price_impact, price_impact},
    types::{format_units, SwapParams},
    AppError, Dex,
};
use rust_decimal::Decimal;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_quote_direct_pair_six_to_eighteen_decimals() {
    let mock = MockChain::new();
    let (r_usd, r_a) = (units(2_000_000, 6), units(1_000, 18));
    mock.add_pair(USD, TKA, r_usd, r_a);
    let dex = read_adapter(&mock);
    let registry = test_registry();

    let quote = assert_ok!(
        dex.get_quote(&token(&registry, "USD"), &token(&registry, "TKA"), "2000").await
    );

    let expected = amount_out(units(2_000, 6), r_usd, r_a);
    assert_eq!(quote.amount_out_raw, expected.to_string());
    assert_eq!(quote.amount_out, format_units(expected, 18));
    // Roughly one TKA, less the 0.3% fee and impact.
    assert!(quote.amount_out.starts_with("0.99"), "amount_out: {}", quote.amount_out);
    assert_eq!(quote.route.path(), &[USD, TKA]);
    assert_eq!(quote.gas_estimate, estimate_swap_gas(1));
}

#[tokio::test]
async fn test_wrap_and_unwrap_quote_one_to_one() {
    let mock = MockChain::new();
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let wrapped = token(&registry, "WTEST");

    let wrap = dex.get_quote(&native(), &wrapped, "1.5").await.unwrap();
    assert_eq!(wrap.amount_out, "1.5");
    assert_eq!(wrap.amount_out_raw, "1500000000000000000");
    assert_eq!(wrap.price_impact, Decimal::ZERO);
    assert_eq!(wrap.gas_estimate, GAS_WRAP_UNWRAP);

    let unwrap = dex.get_quote(&wrapped, &native(), "0.000000000000000001").await.unwrap();
    assert_eq!(unwrap.amount_out_raw, "1");
    assert_eq!(unwrap.price_impact, Decimal::ZERO);

    // Neither touched the router.
    assert_eq!(mock.pair_lookups(), 0);
}

#[tokio::test]
async fn test_price_impact_grows_with_amount() {
    let mock = MockChain::new();
    mock.add_pair(TKA, TKB, units(1_000, 18), units(1_000, 18));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    let mut last = Decimal::ZERO;
    for amount in ["0.001", "1", "10", "100", "1000", "1000000"] {
        let quote = dex.get_quote(&a, &b, amount).await.unwrap();
        assert!(quote.price_impact > last, "{} <= {} at {}", quote.price_impact, last, amount);
        assert!(quote.price_impact <= Decimal::ONE_HUNDRED);
        last = quote.price_impact;
    }
    assert!(last > Decimal::from(99));
}

#[tokio::test]
async fn test_multi_hop_impact_is_compounded() {
    let mock = MockChain::new();
    let (r_a, r_w1) = (units(1_000, 18), units(500, 18));
    let (r_w2, r_b) = (units(50, 18), units(5_000, 18));
    mock.add_pair(TKA, WRAPPED, r_a, r_w1);
    mock.add_pair(WRAPPED, TKB, r_w2, r_b);
    let dex = read_adapter(&mock);
    let registry = test_registry();

    let quote =
        dex.get_quote(&token(&registry, "TKA"), &token(&registry, "TKB"), "10").await.unwrap();
    assert_eq!(quote.route.path(), &[TKA, WRAPPED, TKB]);
    assert_eq!(quote.gas_estimate, estimate_swap_gas(2));

    let first_in = units(10, 18);
    let second_in = amount_out(first_in, r_a, r_w1);
    let expected = compound_price_impact(&[
        price_impact(first_in, r_a),
        price_impact(second_in, r_w2),
    ]);
    assert_eq!(quote.price_impact, expected);

    // Worse than either hop alone, never worse than their sum.
    let second = price_impact(second_in, r_w2);
    assert!(quote.price_impact > second);
    assert!(quote.price_impact <= price_impact(first_in, r_a) + second);
}

#[tokio::test]
async fn test_single_pair_impact_formula() {
    let mock = MockChain::new();
    mock.add_pair(TKA, TKB, units(99, 18), units(99, 18));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    // 1 into 99 is 1% of the post-trade reserve.
    assert_eq!(dex.calculate_price_impact(&a, &b, "1").await.unwrap(), Decimal::ONE);

    let c = token(&registry, "TKC");
    assert_eq!(dex.calculate_price_impact(&a, &c, "1").await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn test_quote_without_path() {
    let mock = MockChain::new();
    let dex = read_adapter(&mock);
    let registry = test_registry();

    let (a, c) = (token(&registry, "TKA"), token(&registry, "TKC"));

    for _ in 0..3 {
        let err = assert_err!(dex.get_quote(&a, &c, "1").await);
        assert!(matches!(err, AppError::PairNotFound));
        assert!(!err.is_retryable());
    }
    let err = assert_err!(dex.get_quote(&c, &a, "1").await);
    assert!(matches!(err, AppError::PairNotFound));
}

#[tokio::test]
async fn test_router_failure_is_retryable_quote_error() {
    let mock = MockChain::new();
    mock.add_pair(TKA, TKB, units(1_000, 18), units(1_000, 18));
    mock.fail_amounts_out();
    let dex = read_adapter(&mock);
    let registry = test_registry();

    let err = dex
        .get_quote(&token(&registry, "TKA"), &token(&registry, "TKB"), "1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::QuoteFailed(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_invalid_amounts() {
    let mock = MockChain::new();
    mock.add_pair(TKA, TKB, units(1_000, 18), units(1_000, 18));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    for amount in ["0", "0.0", "", "-1", "abc", "1.2.3", "0x10", "1.0x1", "1.\u{e9}"] {
        let result = dex.get_quote(&a, &b, amount).await;
        assert!(matches!(result, Err(AppError::InvalidAmount(_))), "amount {:?}", amount);
    }
}

#[tokio::test]
async fn test_tokens_from_other_chain_rejected() {
    let mock = MockChain::new();
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let foreign = multichain_dex::types::Token::erc20(1, TKA, "TKA", "Token A", 18);

    let result = dex.get_quote(&foreign, &token(&registry, "TKB"), "1").await;
    assert!(matches!(result, Err(AppError::UnsupportedToken { chain_id: CHAIN_ID, .. })));
}

#[tokio::test]
async fn test_swap_params_from_quote_apply_slippage() {
    let mock = MockChain::new();
    mock.add_pair(TKA, USD, units(1_000, 18), units(1_000_000, 6));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, usd) = (token(&registry, "TKA"), token(&registry, "USD"));

    let quote = dex.get_quote(&a, &usd, "1").await.unwrap();
    let params = SwapParams::from_quote(a, usd, "1", &quote, Decimal::ONE, 20).unwrap();

    let out: U256 = quote.amount_out_raw.parse().unwrap();
    let min = out * U256::from(99u64) / U256::from(100u64);
    assert_eq!(params.amount_out_min, format_units(min, 6));
    assert_eq!(params.route, quote.route);
}
