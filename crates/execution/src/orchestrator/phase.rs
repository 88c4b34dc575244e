//! Phases of an orchestration run and the legal moves between them.

use crate::error::SwapError;
use amm_swap_domain::TokenAmount;
use std::fmt;

/// State of the allowance-gated orchestrator.
///
/// ```text
/// Idle -> Validating -> CheckingAllowance -> (Approving ->) Swapping -> Confirming -> Done
///   \________________________\_____________________\____________\___________\-> Failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SwapPhase {
    /// No run in flight.
    #[default]
    Idle,
    /// Normalizing the requested amount.
    Validating,
    /// Reading the current allowance.
    CheckingAllowance,
    /// Submitting the approval and waiting for its confirmation.
    Approving,
    /// Submitting the pool write.
    Swapping,
    /// Waiting for the pool write to confirm.
    Confirming,
    /// Pool write confirmed.
    Done,
    /// Run ended with an error.
    Failed(SwapError),
}

impl SwapPhase {
    /// `Done` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    /// Whether the state graph allows moving from `self` to `next`.
    pub fn can_advance_to(&self, next: &SwapPhase) -> bool {
        use SwapPhase::*;
        match (self, next) {
            (Done | Failed(_), _) => false,
            (_, Failed(_)) => true,
            (Idle, Validating)
            | (Validating, CheckingAllowance)
            | (CheckingAllowance, Approving | Swapping)
            | (Approving, Swapping)
            | (Swapping, Confirming)
            | (Confirming, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::CheckingAllowance => f.write_str("checking allowance"),
            Self::Approving => f.write_str("approving"),
            Self::Swapping => f.write_str("swapping"),
            Self::Confirming => f.write_str("confirming"),
            Self::Done => f.write_str("done"),
            Self::Failed(e) => write!(f, "failed ({e})"),
        }
    }
}

/// Whether an approval must precede a pool write of `amount_in`.
///
/// Both sides are minor units of the same token.
pub fn approval_required(allowance: TokenAmount, amount_in: TokenAmount) -> bool {
    allowance < amount_in
}
