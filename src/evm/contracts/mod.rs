//! Smart contract bindings.

pub mod erc20;
pub mod uniswap_v2;
pub mod weth;
