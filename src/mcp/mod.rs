//! MCP server module.
//!
//! Contains the MCP server implementation with tool handlers.

pub mod server;

pub use server::MultichainDexServer;
pub use server::{
    GetPairInfoInput, GetQuoteInput, GetSwapRouteInput, IsTokenSupportedInput, SwapTokensInput,
};
