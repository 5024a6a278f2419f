//! Error types and handling module.
//!
//! Read-path lookups (pair discovery, reserves) turn most failures into sentinel values
//! before they ever reach this type. What remains here is either structural
//! (`PairNotFound`), an integration mistake (`NoClient`, `NoAccount`, `NoWallet`) or a
//! write-path failure that must be surfaced.

use alloy::primitives::Address;
use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ethereum RPC errors.
    #[error("Ethereum RPC error: {0}")]
    Rpc(String),

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid Ethereum address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount could not be parsed or is out of range.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// No chain with this id is configured.
    #[error("Unknown chain: {0}")]
    UnknownChain(u64),

    /// Token is not part of the configured registry for its chain.
    #[error("Unsupported token {token} on chain {chain_id}")]
    UnsupportedToken { chain_id: u64, token: Address },

    /// No liquidity path exists between the two tokens.
    #[error("No liquidity path found for token pair")]
    PairNotFound,

    /// The router simulation could not be completed.
    #[error("Quote failed: {0}")]
    QuoteFailed(String),

    /// The on-chain write reverted or was rejected.
    #[error("Swap failed: {0}")]
    SwapFailed(String),

    /// No read capability was supplied.
    #[error("No chain client configured for reads")]
    NoClient,

    /// No account is connected to the session.
    #[error("No account connected")]
    NoAccount,

    /// No write capability (or credential prompt) was supplied.
    #[error("No wallet available to sign transactions")]
    NoWallet,

    /// The user dismissed the credential prompt; nothing was submitted.
    #[error("Transaction aborted by user")]
    Aborted,

    /// Wallet-related errors.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Numeric overflow during conversion.
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),
}

impl AppError {
    /// Whether a caller may reasonably retry the operation that produced this error.
    ///
    /// Only read-side transient failures qualify. Writes are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::QuoteFailed(_) | AppError::Rpc(_) | AppError::Transport(_))
    }
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::contract::Error> for AppError {
    fn from(err: alloy::contract::Error) -> Self {
        AppError::Rpc(err.to_string())
    }
}

impl From<alloy::signers::local::LocalSignerError> for AppError {
    fn from(err: alloy::signers::local::LocalSignerError) -> Self {
        AppError::Wallet(err.to_string())
    }
}

impl From<alloy::hex::FromHexError> for AppError {
    fn from(err: alloy::hex::FromHexError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(err: std::num::ParseIntError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidAddress(_)
            | AppError::InvalidAmount(_)
            | AppError::PairNotFound
            | AppError::UnknownChain(_)
            | AppError::UnsupportedToken { .. }
            | AppError::Parse(_)
            | AppError::NumericOverflow(_) => McpError::invalid_params(err.to_string(), None),
            AppError::Config(_) | AppError::NoAccount | AppError::NoWallet => {
                McpError::invalid_request(err.to_string(), None)
            }
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
