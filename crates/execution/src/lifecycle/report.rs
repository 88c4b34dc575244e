//! Outcome of one orchestration run.

use super::{OperationKind, PhaseChange};
use crate::error::SwapError;
use crate::orchestrator::SwapPhase;
use crate::sync::PoolSnapshot;
use amm_swap_domain::{Address, TokenAmount};
use amm_swap_protocols::prelude::TxHash;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Everything a caller needs to know about a finished run.
#[derive(Debug, Clone)]
pub struct SwapReport {
    /// Run id.
    pub id: Uuid,
    /// Pool write driven by the run.
    pub kind: OperationKind,
    /// Identity the run acted for.
    pub owner: Option<Address>,
    /// Minor-unit amount of the configured token the run needed approved.
    pub amount_in: Option<TokenAmount>,
    /// Allowance observed before deciding whether to approve.
    pub allowance_before: Option<TokenAmount>,
    /// Approval transaction, if one was submitted.
    pub approval_tx: Option<TxHash>,
    /// Pool transaction, if one was submitted.
    pub pool_tx: Option<TxHash>,
    /// Every phase entered, in order. The last entry is terminal.
    pub transitions: Vec<PhaseChange>,
    /// State refreshed after the run, when a refresh was triggered.
    pub snapshot: Option<PoolSnapshot>,
    /// Run start.
    pub started_at: DateTime<Utc>,
    /// Run end.
    pub finished_at: DateTime<Utc>,
}

impl SwapReport {
    /// Terminal phase.
    pub fn phase(&self) -> SwapPhase {
        self.transitions
            .last()
            .map(|t| t.phase.clone())
            .unwrap_or(SwapPhase::Idle)
    }

    /// True if the run reached `Done`.
    pub fn is_done(&self) -> bool {
        self.phase() == SwapPhase::Done
    }

    /// The failure, if the run failed.
    pub fn error(&self) -> Option<SwapError> {
        match self.phase() {
            SwapPhase::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Phases entered, without timestamps.
    pub fn phases(&self) -> Vec<SwapPhase> {
        self.transitions.iter().map(|t| t.phase.clone()).collect()
    }

    /// Whether an approval was submitted during the run.
    pub fn approved(&self) -> bool {
        self.approval_tx.is_some()
    }

    /// Human-readable terminal status.
    pub fn status(&self) -> String {
        match self.phase() {
            SwapPhase::Done => match self.pool_tx {
                Some(tx) => format!("{} confirmed in {tx}", self.kind),
                None => format!("{} confirmed", self.kind),
            },
            SwapPhase::Failed(e) => format!("{} failed: {e}", self.kind),
            other => format!("{} stopped in {other}", self.kind),
        }
    }

    /// Converts to a `Result`, keeping the report on success.
    ///
    /// # Errors
    /// Returns the run's failure.
    pub fn into_result(self) -> Result<Self, SwapError> {
        match self.error() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}
