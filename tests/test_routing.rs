//! Integration tests for pair discovery and route planning.
//!
//! Run with: `cargo test --test test_routing`

mod common;

use common::*;
use multichain_dex::{AppError, Dex, DexAdapter};

#[tokio::test]
async fn test_direct_route_is_symmetric() {
    let mock = MockChain::new();
    mock.add_pair(TKA, TKB, units(1_000, 18), units(2_000, 18));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    let forward = dex.get_swap_route(&a, &b).await.unwrap();
    let backward = dex.get_swap_route(&b, &a).await.unwrap();

    assert_eq!(forward.path(), &[TKA, TKB]);
    let mut reversed = backward.into_inner();
    reversed.reverse();
    assert_eq!(forward.path(), reversed.as_slice());
}

#[tokio::test]
async fn test_missing_pair_is_none_every_time() {
    let mock = MockChain::new();
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    for _ in 0..3 {
        assert_eq!(dex.get_pair_address(&a, &b).await.unwrap(), None);
        assert_eq!(dex.get_pair_info(&a, &b).await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_pair_info_in_either_order() {
    let mock = MockChain::new();
    let pair = mock.add_pair(TKA, USD, units(500, 18), units(1_000, 6));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, usd) = (token(&registry, "TKA"), token(&registry, "USD"));

    let info = dex.get_pair_info(&usd, &a).await.unwrap().unwrap();
    assert_eq!(info.pair_address, pair);
    assert_eq!(info.reserves_for(TKA), Some((units(500, 18), units(1_000, 6))));
    assert_eq!(dex.get_pair_address(&a, &usd).await.unwrap(), Some(pair));
    assert_eq!(dex.get_pair_address(&usd, &a).await.unwrap(), Some(pair));
}

#[tokio::test]
async fn test_lookup_failures_mean_no_pair() {
    let mock = MockChain::new();
    mock.add_pair(TKA, TKB, units(1, 18), units(1, 18));
    mock.fail_pair_lookups();
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    assert_eq!(dex.get_pair_address(&a, &b).await.unwrap(), None);
    assert!(dex.get_swap_route(&a, &b).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrapped_native_bridge_preferred() {
    let mock = MockChain::new();
    mock.add_pair(TKA, WRAPPED, units(100, 18), units(100, 18));
    mock.add_pair(WRAPPED, TKB, units(100, 18), units(100, 18));
    mock.add_pair(TKA, USD, units(100, 18), units(100, 6));
    mock.add_pair(USD, TKB, units(100, 6), units(100, 18));
    let dex = read_adapter(&mock);
    let registry = test_registry();

    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));
    let route = dex.get_swap_route(&a, &b).await.unwrap();
    assert_eq!(route.path(), &[TKA, WRAPPED, TKB]);
}

#[tokio::test]
async fn test_stablecoin_bridge_when_no_wrapped_path() {
    let mock = MockChain::new();
    mock.add_pair(TKA, DAI, units(100, 18), units(100, 18));
    mock.add_pair(DAI, TKB, units(100, 18), units(100, 18));
    let dex = read_adapter(&mock);
    let registry = test_registry();

    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));
    let route = dex.get_swap_route(&a, &b).await.unwrap();
    assert_eq!(route.path(), &[TKA, DAI, TKB]);
    assert_eq!(route.hops(), 2);
}

#[tokio::test]
async fn test_two_intermediate_route() {
    let mock = MockChain::new();
    mock.add_pair(TKA, USD, units(100, 18), units(100, 6));
    mock.add_pair(USD, DAI, units(100, 6), units(100, 18));
    mock.add_pair(DAI, TKB, units(100, 18), units(100, 18));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    let route = dex.get_swap_route(&a, &b).await.unwrap();
    assert_eq!(route.path(), &[TKA, USD, DAI, TKB]);

    let back = dex.get_swap_route(&b, &a).await.unwrap();
    assert_eq!(back.path(), &[TKB, DAI, USD, TKA]);
}

#[tokio::test]
async fn test_no_path_is_empty_and_bounded() {
    let mock = MockChain::new();
    // Liquidity exists, just not connected to TKB.
    mock.add_pair(TKA, WRAPPED, units(100, 18), units(100, 18));
    mock.add_pair(WRAPPED, USD, units(100, 18), units(100, 6));
    let dex = read_adapter(&mock);
    let registry = test_registry();

    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));
    let route = dex.get_swap_route(&a, &b).await.unwrap();
    assert!(route.is_empty());

    // direct + 3 (from, bridge) + 3 (bridge, to) + 3 (bridge, bridge)
    assert!(mock.pair_lookups() <= 10, "lookups: {}", mock.pair_lookups());
}

#[tokio::test]
async fn test_native_routes_through_wrapped_address() {
    let mock = MockChain::new();
    mock.add_pair(WRAPPED, USD, units(100, 18), units(200_000, 6));
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let usd = token(&registry, "USD");

    let route = dex.get_swap_route(&native(), &usd).await.unwrap();
    assert_eq!(route.path(), &[WRAPPED, USD]);

    let route = dex.get_swap_route(&usd, &native()).await.unwrap();
    assert_eq!(route.path(), &[USD, WRAPPED]);
}

#[tokio::test]
async fn test_wrap_route_needs_no_pool() {
    let mock = MockChain::new();
    let dex = read_adapter(&mock);
    let registry = test_registry();
    let wrapped = token(&registry, "WTEST");

    let route = dex.get_swap_route(&native(), &wrapped).await.unwrap();
    assert_eq!(route.path(), &[native().address, WRAPPED]);

    let route = dex.get_swap_route(&wrapped, &native()).await.unwrap();
    assert_eq!(route.path(), &[WRAPPED, native().address]);
    assert_eq!(mock.pair_lookups(), 0);
}

#[tokio::test]
async fn test_reads_require_client() {
    let dex = DexAdapter::new(test_registry(), CHAIN_ID).unwrap();
    let registry = test_registry();
    let (a, b) = (token(&registry, "TKA"), token(&registry, "TKB"));

    assert!(!dex.has_client());
    assert!(matches!(dex.get_swap_route(&a, &b).await, Err(AppError::NoClient)));
    assert!(matches!(dex.get_pair_address(&a, &b).await, Err(AppError::NoClient)));
}

#[tokio::test]
async fn test_resolve_unlisted_token_from_metadata() {
    let mock = MockChain::new();
    let unlisted = alloy::primitives::Address::repeat_byte(0xd4);
    mock.add_metadata(unlisted, "NEW", 9);
    let dex = read_adapter(&mock);

    let token = dex.resolve_token(&format!("{:?}", unlisted)).await.unwrap();
    assert_eq!(token.symbol, "NEW");
    assert_eq!(token.decimals, 9);
    assert!(!dex.is_token_supported(&token));

    let missing = alloy::primitives::Address::repeat_byte(0xd5);
    let result = dex.resolve_token(&format!("{:?}", missing)).await;
    assert!(matches!(result, Err(AppError::UnsupportedToken { .. })));
}
