//! Routing, quoting and execution services.

pub mod chain_registry;
pub mod dex;
pub mod pair_resolver;
pub mod quote;
pub mod quote_tracker;
pub mod route_planner;
pub mod swap;

pub use chain_registry::{ChainRegistry, TokenListResponse, TokenListToken};
pub use dex::{Dex, DexAdapter};
pub use pair_resolver::PairResolver;
pub use quote::{compound_price_impact, price_impact, QuoteEngine};
pub use quote_tracker::{QuoteRequestTracker, QuoteTicket};
pub use route_planner::RoutePlanner;
pub use swap::{SwapExecutor, SwapVariant};
