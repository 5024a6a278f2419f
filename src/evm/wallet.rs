//! Accounts and the wallet session.
//!
//! The session is an explicit object handed to whatever needs signer access. Consumers
//! subscribe to [`SessionEvent`]s instead of reading shared global state.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::error::{AppError, Result};

/// Asks the user for the secret that unlocks a custodial account.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// `None` means the user dismissed the prompt.
    async fn request_secret(&self, account: Address) -> Option<String>;
}

/// Turns a custodial account's secret into a signer.
#[async_trait]
pub trait CustodialUnlocker: Send + Sync {
    async fn unlock(&self, account: Address, secret: &str) -> Result<PrivateKeySigner>;
}

/// A connected account.
#[derive(Clone)]
pub enum Account {
    /// Key held by an external wallet; signs without prompting.
    External(PrivateKeySigner),
    /// App-managed key; every write needs a secret from the user first.
    Custodial { address: Address, unlocker: Arc<dyn CustodialUnlocker> },
}

impl Account {
    /// Create an external account from a private key string.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        // Remove 0x prefix if present
        let key = private_key.strip_prefix("0x").unwrap_or(private_key);

        let signer: PrivateKeySigner =
            key.parse().map_err(|e: alloy::signers::local::LocalSignerError| {
                AppError::Wallet(e.to_string())
            })?;

        tracing::info!(address = %signer.address(), "External account initialized");

        Ok(Account::External(signer))
    }

    pub fn custodial(address: Address, unlocker: Arc<dyn CustodialUnlocker>) -> Self {
        Account::Custodial { address, unlocker }
    }

    /// Get the account address.
    pub fn address(&self) -> Address {
        match self {
            Account::External(signer) => signer.address(),
            Account::Custodial { address, .. } => *address,
        }
    }

    pub fn is_custodial(&self) -> bool {
        matches!(self, Account::Custodial { .. })
    }

    /// Obtain a signer, prompting for the secret when the account is custodial.
    ///
    /// A dismissed prompt yields [`AppError::Aborted`]; no prompt at all for a custodial
    /// account is an integration error ([`AppError::NoWallet`]).
    pub async fn signer(&self, prompt: Option<&dyn CredentialPrompt>) -> Result<PrivateKeySigner> {
        match self {
            Account::External(signer) => Ok(signer.clone()),
            Account::Custodial { address, unlocker } => {
                let prompt = prompt.ok_or(AppError::NoWallet)?;

                tracing::debug!(address = %address, "Requesting credential for custodial account");
                let secret = prompt.request_secret(*address).await.ok_or(AppError::Aborted)?;

                let signer = unlocker.unlock(*address, &secret).await?;
                if signer.address() != *address {
                    return Err(AppError::Wallet(format!(
                        "unlocked key does not belong to {}",
                        address
                    )));
                }
                Ok(signer)
            }
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_custodial() { "custodial" } else { "external" };
        f.debug_struct("Account").field("kind", &kind).field("address", &self.address()).finish()
    }
}

/// Session change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected(Address),
    Disconnected,
}

/// Holds the active account and notifies subscribers when it changes.
#[derive(Clone)]
pub struct WalletSession {
    account: Arc<RwLock<Option<Account>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl WalletSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { account: Arc::new(RwLock::new(None)), events }
    }

    /// Session with `account` already connected.
    pub fn with_account(account: Account) -> Self {
        let session = Self::new();
        session.connect(account);
        session
    }

    /// Replace the active account. Subscribers hear about it only once it is stored.
    pub fn connect(&self, account: Account) {
        let address = account.address();
        match self.account.write() {
            Ok(mut guard) => *guard = Some(account),
            Err(_) => {
                tracing::warn!(address = %address, "Session lock poisoned, account not connected");
                return;
            }
        }
        tracing::info!(address = %address, "Account connected");
        // No receivers is fine.
        let _ = self.events.send(SessionEvent::Connected(address));
    }

    pub fn disconnect(&self) {
        let previous = match self.account.write() {
            Ok(mut guard) => guard.take(),
            Err(_) => {
                tracing::warn!("Session lock poisoned, account not disconnected");
                return;
            }
        };
        if previous.is_some() {
            tracing::info!("Account disconnected");
            let _ = self.events.send(SessionEvent::Disconnected);
        }
    }

    /// The connected account, if any.
    pub fn account(&self) -> Option<Account> {
        self.account.read().ok().and_then(|guard| guard.clone())
    }

    /// The connected account, or [`AppError::NoAccount`].
    pub fn require_account(&self) -> Result<Account> {
        self.account().ok_or(AppError::NoAccount)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}
