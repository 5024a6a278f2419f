//! EVM interaction module.
//!
//! Contains the RPC client, the read/write capability traits, contract bindings,
//! built-in deployments and the wallet session.

pub mod chains;
pub mod client;
pub mod constants;
pub mod contracts;
pub mod rpc;
pub mod wallet;

pub use client::{EvmClient, HttpProvider};
pub use rpc::{ChainReader, ChainWriter, PairState};
pub use wallet::{Account, CredentialPrompt, CustodialUnlocker, SessionEvent, WalletSession};
