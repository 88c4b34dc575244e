//! External wallet capability.

use crate::error::LedgerError;
use crate::rpc::RpcProvider;
use amm_swap_domain::Address;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Something that can authorize account access and sign for it.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Requests authorization; returns the accounts the user approved,
    /// the active one first.
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError>;
}

/// Wallet backed by a JSON-RPC endpoint that holds the signing keys.
pub struct RpcWallet {
    provider: Arc<RpcProvider>,
}

impl RpcWallet {
    /// Creates a wallet over the given endpoint.
    pub fn new(provider: Arc<RpcProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletCapability for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        match self.provider.request_accounts().await {
            // Plain nodes only expose already-unlocked accounts.
            Err(e) if e.is_method_not_found() => {
                debug!("eth_requestAccounts unsupported, using eth_accounts");
                self.provider.accounts().await
            }
            other => other,
        }
    }
}
