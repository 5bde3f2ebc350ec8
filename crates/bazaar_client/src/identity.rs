//! # Wallet Identity
//!
//! The seam between the mutation dispatcher and whatever holds keys.
//! The dispatcher only ever asks one question - is an account active -
//! so the port is exactly that question. Signing stays inside the
//! provider, next to the transport.

use alloy_primitives::Address;
use parking_lot::RwLock;

/// Source of the currently-active account, if any.
pub trait WalletIdentity: Send + Sync {
    /// The connected account, or `None` when no wallet is connected.
    fn active_account(&self) -> Option<Address>;
}

/// A wallet identity backed by a plain slot.
///
/// Suits tests and single-user tools; interactive embedders usually
/// implement [`WalletIdentity`] over their session state instead.
#[derive(Debug, Default)]
pub struct StaticWallet {
    account: RwLock<Option<Address>>,
}

impl StaticWallet {
    /// A wallet with no connected account.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A wallet already connected to `account`.
    #[must_use]
    pub fn connected(account: Address) -> Self {
        Self {
            account: RwLock::new(Some(account)),
        }
    }

    /// Connects an account, replacing any previous one.
    pub fn connect(&self, account: Address) {
        *self.account.write() = Some(account);
    }

    /// Disconnects the current account.
    pub fn disconnect(&self) {
        *self.account.write() = None;
    }
}

impl WalletIdentity for StaticWallet {
    fn active_account(&self) -> Option<Address> {
        *self.account.read()
    }
}
