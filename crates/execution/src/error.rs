//! Failure taxonomy for identity resolution, orchestration and sync.

use amm_swap_domain::{Address, AmountError};
use amm_swap_protocols::prelude::{LedgerError, TxHash};
use std::time::Duration;
use thiserror::Error;

/// Terminal failure of an operation. `Display` is the user-facing status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// No wallet capability was supplied.
    #[error("no wallet available to authorize an account")]
    NoWalletCapability,
    /// The wallet refused account access.
    #[error("wallet authorization denied: {0}")]
    AuthorizationDenied(String),
    /// An operation that needs an identity ran without one.
    #[error("not connected: connect a wallet first")]
    NotConnected,
    /// The requested amount is unparsable, negative or zero.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// An allowance, reserve, balance, decimals or account query failed.
    #[error("ledger read failed: {0}")]
    ReadError(String),
    /// The pool address is the zero placeholder.
    #[error("pool address is not configured")]
    PoolNotConfigured,
    /// The token address is the zero placeholder.
    #[error("token address is not configured")]
    TokenNotConfigured,
    /// The signer declined the approval.
    #[error("approval rejected by signer: {0}")]
    ApprovalRejected(String),
    /// The approval was not accepted or reverted.
    #[error("approval failed: {0}")]
    ApprovalFailed(String),
    /// The signer declined the swap, or the node refused to accept it.
    #[error("swap rejected: {0}")]
    SwapRejected(String),
    /// The pool program reverted the swap.
    #[error("swap reverted: {0}")]
    SwapReverted(String),
    /// The signer declined the deposit, or the node refused to accept it.
    #[error("deposit rejected: {0}")]
    DepositRejected(String),
    /// The pool program reverted the deposit.
    #[error("deposit reverted: {0}")]
    DepositReverted(String),
    /// No receipt within the wait bound. The transaction may still land.
    #[error("transaction {hash} not confirmed within {waited:?}; it may still be mined")]
    ConfirmationTimeout {
        /// Submitted transaction.
        hash: TxHash,
        /// Wait bound that elapsed.
        waited: Duration,
    },
    /// Another run for the same identity has not finished.
    #[error("an operation for {0} is already in flight")]
    OrchestrationBusy(Address),
    /// The orchestrator attempted a transition its state graph forbids.
    #[error("internal orchestration error: {0}")]
    Internal(String),
}

impl SwapError {
    /// True if the ledger may have changed state during the failed run.
    #[must_use]
    pub fn may_have_landed(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }

    pub(crate) fn read(e: LedgerError) -> Self {
        Self::ReadError(e.to_string())
    }
}

impl From<AmountError> for SwapError {
    fn from(e: AmountError) -> Self {
        Self::InvalidAmount(e.to_string())
    }
}
