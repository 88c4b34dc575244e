//! Lifecycle events for orchestration runs.

use crate::orchestrator::SwapPhase;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Which pool write a run drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationKind {
    /// `swapExactTokensForTokens`.
    Swap,
    /// `addLiquidity`.
    Deposit,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swap => f.write_str("swap"),
            Self::Deposit => f.write_str("deposit"),
        }
    }
}

/// One phase change within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseChange {
    /// Phase entered.
    pub phase: SwapPhase,
    /// When it was entered.
    pub at: DateTime<Utc>,
}

impl PhaseChange {
    /// Records entry into `phase` now.
    pub fn now(phase: SwapPhase) -> Self {
        Self {
            phase,
            at: Utc::now(),
        }
    }
}
