//! Bounded route search through hub tokens.
//!
//! Liquidity on these AMMs concentrates around the wrapped native token and a few
//! stablecoins, so routes are tried in a fixed priority order instead of searching the
//! pair graph.

use std::collections::HashMap;

use alloy::primitives::Address;

use super::PairResolver;
use crate::types::{Route, Token};

/// Finds a route between two tokens on one chain.
#[derive(Clone)]
pub struct RoutePlanner {
    resolver: PairResolver,
}

impl RoutePlanner {
    pub fn new(resolver: PairResolver) -> Self {
        Self { resolver }
    }

    /// Route from `token_in` to `token_out`; empty when no path exists.
    ///
    /// Wrap and unwrap pairs keep their own addresses since they never touch a pool.
    pub async fn get_swap_route(&self, token_in: &Token, token_out: &Token) -> Route {
        let chain = self.resolver.chain();
        if chain.is_wrap_or_unwrap(token_in, token_out) {
            return Route::new(vec![token_in.address, token_out.address]);
        }

        let from = chain.addressable(token_in);
        let to = chain.addressable(token_out);
        self.plan(from, to).await
    }

    /// Route between two addressable tokens.
    pub async fn plan(&self, from: Address, to: Address) -> Route {
        if from == to {
            return Route::empty();
        }

        let bridges = self.resolver.chain().bridge_priority();
        let mut known: HashMap<(Address, Address), bool> = HashMap::new();

        for path in candidate_paths(from, to, &bridges) {
            if self.connected(&path, &mut known).await {
                let route = Route::new(path);
                tracing::debug!(
                    chain_id = self.resolver.chain().chain_id,
                    route = %route,
                    "Route found"
                );
                return route;
            }
        }

        tracing::debug!(
            chain_id = self.resolver.chain().chain_id,
            token_in = %from,
            token_out = %to,
            "No liquidity path"
        );
        Route::empty()
    }

    /// Whether every consecutive pair of `path` has a pool. Lookups are memoized per search.
    async fn connected(
        &self,
        path: &[Address],
        known: &mut HashMap<(Address, Address), bool>,
    ) -> bool {
        for hop in path.windows(2) {
            let key = if hop[0] < hop[1] { (hop[0], hop[1]) } else { (hop[1], hop[0]) };
            let exists = match known.get(&key) {
                Some(exists) => *exists,
                None => {
                    let exists = self.resolver.has_pair(hop[0], hop[1]).await;
                    known.insert(key, exists);
                    exists
                }
            };
            if !exists {
                return false;
            }
        }
        true
    }
}

/// Candidate paths in the order they are tried: direct, one bridge, then two distinct
/// bridges. Bridges equal to either endpoint are skipped.
pub fn candidate_paths(from: Address, to: Address, bridges: &[Address]) -> Vec<Vec<Address>> {
    let usable: Vec<Address> = bridges.iter().copied().filter(|b| *b != from && *b != to).collect();

    let mut paths = vec![vec![from, to]];
    paths.extend(usable.iter().map(|b| vec![from, *b, to]));
    for first in &usable {
        for second in &usable {
            if first != second {
                paths.push(vec![from, *first, *second, to]);
            }
        }
    }
    paths
}
