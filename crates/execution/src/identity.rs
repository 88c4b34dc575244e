//! Identity resolution through an external wallet capability.

use crate::error::SwapError;
use amm_swap_domain::Address;
use amm_swap_protocols::prelude::WalletCapability;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The connected signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Signer address.
    pub address: Address,
    /// When the wallet last authorized it.
    pub connected_at: DateTime<Utc>,
}

/// Resolves and holds the active signing identity for a session.
pub struct IdentityResolver {
    /// Wallet capability, if one is present.
    wallet: Option<Arc<dyn WalletCapability>>,
    /// Active identity.
    current: RwLock<Option<Identity>>,
}

impl IdentityResolver {
    /// Creates a resolver. `None` models an environment with no wallet.
    pub fn new(wallet: Option<Arc<dyn WalletCapability>>) -> Self {
        Self {
            wallet,
            current: RwLock::new(None),
        }
    }

    /// Requests authorization and makes the first approved account active.
    ///
    /// Calling again while connected re-resolves, picking up account
    /// switches in the wallet.
    ///
    /// # Errors
    /// `NoWalletCapability` without a wallet, `AuthorizationDenied` when the
    /// user declines or no account is returned, `ReadError` when the wallet
    /// cannot be reached.
    pub async fn connect(&self) -> Result<Identity, SwapError> {
        let wallet = self
            .wallet
            .as_ref()
            .ok_or(SwapError::NoWalletCapability)?;

        let accounts = match wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) if e.is_user_rejection() => {
                warn!(error = %e, "Wallet authorization denied");
                return Err(SwapError::AuthorizationDenied(e.to_string()));
            }
            Err(e) => return Err(SwapError::read(e)),
        };

        let address = accounts.first().copied().ok_or_else(|| {
            SwapError::AuthorizationDenied("wallet returned no accounts".to_string())
        })?;

        let identity = Identity {
            address,
            connected_at: Utc::now(),
        };

        let previous = self.current.write().await.replace(identity.clone());
        match previous {
            Some(prev) if prev.address != address => {
                info!(previous = %prev.address, address = %address, "Wallet account switched");
            }
            _ => info!(address = %address, "Wallet connected"),
        }

        Ok(identity)
    }

    /// The active identity, if any.
    pub async fn current(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    /// Clears the active identity.
    pub async fn disconnect(&self) {
        if let Some(prev) = self.current.write().await.take() {
            info!(address = %prev.address, "Wallet disconnected");
        }
    }

    /// Whether a wallet capability is present at all.
    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }
}
