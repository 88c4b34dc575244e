//! One user session: identity, synchronizer and orchestrator wired together.

use crate::error::SwapError;
use crate::identity::{Identity, IdentityResolver};
use crate::lifecycle::SwapReport;
use crate::orchestrator::{OrchestratorConfig, SwapOrchestrator};
use crate::sync::{PoolSnapshot, PoolStateSynchronizer};
use amm_swap_domain::{DepositRequest, SwapRequest, TokenAmount};
use amm_swap_protocols::prelude::{LedgerConnector, ProgramAddresses, WalletCapability};
use std::sync::Arc;
use tracing::info;

/// Entry point for callers.
pub struct SwapSession {
    resolver: Arc<IdentityResolver>,
    connector: Arc<dyn LedgerConnector>,
    synchronizer: Arc<PoolStateSynchronizer>,
    orchestrator: SwapOrchestrator,
}

impl SwapSession {
    /// Creates a session. Pass `None` when no wallet is available.
    pub fn new(
        wallet: Option<Arc<dyn WalletCapability>>,
        connector: Arc<dyn LedgerConnector>,
        config: OrchestratorConfig,
    ) -> Self {
        let resolver = Arc::new(IdentityResolver::new(wallet));
        let synchronizer = Arc::new(PoolStateSynchronizer::new(connector.clone()));
        let orchestrator = SwapOrchestrator::new(
            resolver.clone(),
            connector.clone(),
            synchronizer.clone(),
            config,
        );
        Self {
            resolver,
            connector,
            synchronizer,
            orchestrator,
        }
    }

    /// Resolves the identity, then refreshes pool state for it.
    ///
    /// # Errors
    /// Identity resolution failures; refresh failures only show as unknown values.
    pub async fn connect(&self) -> Result<(Identity, PoolSnapshot), SwapError> {
        let identity = self.resolver.connect().await?;
        let snapshot = self.synchronizer.refresh(Some(identity.address)).await;
        Ok((identity, snapshot))
    }

    /// Re-reads reserves and, when connected, the identity's balance.
    pub async fn refresh(&self) -> PoolSnapshot {
        let owner = self.resolver.current().await.map(|i| i.address);
        self.synchronizer.refresh(owner).await
    }

    /// Runs a swap.
    pub async fn swap(&self, request: SwapRequest) -> SwapReport {
        self.orchestrator.swap(request).await
    }

    /// Runs a deposit.
    pub async fn add_liquidity(&self, request: DepositRequest) -> SwapReport {
        self.orchestrator.add_liquidity(request).await
    }

    /// Current allowance granted to the pool by the connected identity.
    ///
    /// # Errors
    /// `NotConnected`, `PoolNotConfigured`, `TokenNotConfigured` or `ReadError`.
    pub async fn allowance(&self) -> Result<TokenAmount, SwapError> {
        let owner = self
            .resolver
            .current()
            .await
            .ok_or(SwapError::NotConnected)?
            .address;
        let addresses = self.connector.addresses();
        if !addresses.pool_configured() {
            return Err(SwapError::PoolNotConfigured);
        }
        if !addresses.token_configured() {
            return Err(SwapError::TokenNotConfigured);
        }
        let allowance = self
            .connector
            .bind(None)
            .token
            .allowance(owner, addresses.pool)
            .await
            .map_err(SwapError::read)?;
        info!(owner = %owner, allowance = %allowance, "Allowance read");
        Ok(allowance)
    }

    /// Clears the active identity.
    pub async fn disconnect(&self) {
        self.resolver.disconnect().await;
    }

    /// Active identity, if any.
    pub async fn identity(&self) -> Option<Identity> {
        self.resolver.current().await
    }

    /// Configured program addresses.
    pub fn addresses(&self) -> ProgramAddresses {
        self.connector.addresses()
    }

    /// Pool state synchronizer.
    pub fn synchronizer(&self) -> &Arc<PoolStateSynchronizer> {
        &self.synchronizer
    }

    /// Orchestrator.
    pub fn orchestrator(&self) -> &SwapOrchestrator {
        &self.orchestrator
    }
}
