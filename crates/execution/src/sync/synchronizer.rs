//! Read-through synchronizer for pool reserves and account balance.

use crate::error::SwapError;
use amm_swap_domain::{Address, Amount, DEFAULT_DECIMALS, PoolReserves, TokenAmount};
use amm_swap_protocols::prelude::{LedgerConnector, ProgramBindings};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What the user is currently shown.
///
/// `None` means unknown: the last read failed or was skipped. A failed read
/// never leaves an older value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Pool reserves.
    pub reserves: Option<PoolReserves>,
    /// Account whose balance is shown.
    pub owner: Option<Address>,
    /// Token balance of `owner`.
    pub balance: Option<TokenAmount>,
    /// Decimal count used for display.
    pub decimals: u8,
    /// Time of the refresh that produced this snapshot.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Default for PoolSnapshot {
    fn default() -> Self {
        Self {
            reserves: None,
            owner: None,
            balance: None,
            decimals: DEFAULT_DECIMALS,
            refreshed_at: None,
        }
    }
}

impl PoolSnapshot {
    /// Balance in human units, or `"unknown"`.
    pub fn balance_display(&self) -> String {
        self.balance
            .map(|b| Amount::new(b, self.decimals).to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Issues fresh reserve and balance queries and republishes the results.
pub struct PoolStateSynchronizer {
    /// Program connector; reads never need a signer.
    connector: Arc<dyn LedgerConnector>,
    /// Display feed.
    published: watch::Sender<PoolSnapshot>,
}

impl PoolStateSynchronizer {
    /// Creates a synchronizer.
    pub fn new(connector: Arc<dyn LedgerConnector>) -> Self {
        let (published, _) = watch::channel(PoolSnapshot::default());
        Self {
            connector,
            published,
        }
    }

    /// Subscribes to published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<PoolSnapshot> {
        self.published.subscribe()
    }

    /// Last published snapshot. Display only; not a source of truth.
    pub fn latest(&self) -> PoolSnapshot {
        self.published.borrow().clone()
    }

    fn reader(&self) -> ProgramBindings {
        self.connector.bind(None)
    }

    /// Queries current reserves.
    ///
    /// # Errors
    /// `PoolNotConfigured` for a zero pool address; `ReadError` if the
    /// query fails, in which case published reserves become unknown.
    pub async fn refresh_reserves(&self) -> Result<PoolReserves, SwapError> {
        if !self.connector.addresses().pool_configured() {
            return Err(SwapError::PoolNotConfigured);
        }
        let result = self
            .reader()
            .pool
            .get_reserves()
            .await
            .map_err(SwapError::read);

        let reserves = result.as_ref().ok().copied();
        self.published.send_modify(|s| {
            s.reserves = reserves;
            s.refreshed_at = Some(Utc::now());
        });

        match &result {
            Ok(r) => debug!(reserve_a = %r.reserve_a, reserve_b = %r.reserve_b, "Reserves refreshed"),
            Err(e) => warn!(error = %e, "Reserve refresh failed"),
        }
        result
    }

    /// Queries the token balance of `owner`.
    ///
    /// # Errors
    /// `TokenNotConfigured` for a zero token address; `ReadError` if the
    /// query fails, in which case the published balance becomes unknown.
    pub async fn refresh_balance(&self, owner: Address) -> Result<TokenAmount, SwapError> {
        if !self.connector.addresses().token_configured() {
            return Err(SwapError::TokenNotConfigured);
        }
        let result = self
            .reader()
            .token
            .balance_of(owner)
            .await
            .map_err(SwapError::read);

        let balance = result.as_ref().ok().copied();
        self.published.send_modify(|s| {
            s.owner = Some(owner);
            s.balance = balance;
            s.refreshed_at = Some(Utc::now());
        });

        match &result {
            Ok(b) => debug!(owner = %owner, balance = %b, "Balance refreshed"),
            Err(e) => warn!(owner = %owner, error = %e, "Balance refresh failed"),
        }
        result
    }

    /// Reads the token's decimal count, falling back to the default.
    pub async fn token_decimals(&self) -> u8 {
        if !self.connector.addresses().token_configured() {
            return DEFAULT_DECIMALS;
        }
        match self.reader().token.decimals().await {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, fallback = DEFAULT_DECIMALS, "decimals() failed, using default");
                DEFAULT_DECIMALS
            }
        }
    }

    /// Refreshes everything and publishes a whole new snapshot.
    ///
    /// Never fails: each value that cannot be read is published as unknown.
    /// Reserve loading is skipped while the pool address is unconfigured.
    pub async fn refresh(&self, owner: Option<Address>) -> PoolSnapshot {
        let addresses = self.connector.addresses();
        let reader = self.reader();

        let decimals = self.token_decimals().await;

        let reserves = if addresses.pool_configured() {
            match reader.pool.get_reserves().await {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(error = %e, "Reserve refresh failed");
                    None
                }
            }
        } else {
            debug!("Pool address not configured, skipping reserve load");
            None
        };

        let balance = match owner {
            Some(owner) if addresses.token_configured() => {
                match reader.token.balance_of(owner).await {
                    Ok(b) => Some(b),
                    Err(e) => {
                        warn!(owner = %owner, error = %e, "Balance refresh failed");
                        None
                    }
                }
            }
            _ => None,
        };

        let snapshot = PoolSnapshot {
            reserves,
            owner,
            balance,
            decimals,
            refreshed_at: Some(Utc::now()),
        };

        info!(
            reserves_known = snapshot.reserves.is_some(),
            balance = %snapshot.balance_display(),
            "Pool state refreshed"
        );

        self.published.send_replace(snapshot.clone());
        snapshot
    }
}
