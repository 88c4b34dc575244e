//! Caller-supplied swap and deposit requests.

use crate::error::AmountError;
use crate::token::TokenAmount;
use crate::value_objects::amount::{check_decimal_syntax, to_minor_units};
use serde::{Deserialize, Serialize};

/// An input amount as the caller entered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountInput {
    /// Already in minor units.
    Raw(TokenAmount),
    /// A human decimal string, scaled by the token's decimal count.
    Human(String),
}

impl AmountInput {
    pub fn human(s: impl Into<String>) -> Self {
        Self::Human(s.into())
    }

    /// Whether resolving this input needs the token's decimal count.
    pub fn needs_decimals(&self) -> bool {
        matches!(self, Self::Human(_))
    }

    /// Rejects input that no decimal count could make valid.
    ///
    /// Runs without the ledger: zero raw amounts and malformed human
    /// strings fail here, before any decimals read.
    ///
    /// # Errors
    /// `AmountError::Zero` or the syntax error for the human string.
    pub fn validate(&self) -> Result<(), AmountError> {
        match self {
            Self::Raw(raw) if raw.is_zero() => Err(AmountError::Zero),
            Self::Raw(_) => Ok(()),
            Self::Human(s) => check_decimal_syntax(s),
        }
    }

    /// Resolves to a strictly positive minor-unit amount.
    ///
    /// # Errors
    /// Returns `AmountError::Zero` for zero and the parse error for
    /// malformed human input.
    pub fn resolve(&self, decimals: u8) -> Result<TokenAmount, AmountError> {
        let amount = match self {
            Self::Raw(raw) => *raw,
            Self::Human(s) => to_minor_units(s, decimals)?,
        };
        if amount.is_zero() {
            return Err(AmountError::Zero);
        }
        Ok(amount)
    }
}

impl From<TokenAmount> for AmountInput {
    fn from(v: TokenAmount) -> Self {
        Self::Raw(v)
    }
}

impl From<u64> for AmountInput {
    fn from(v: u64) -> Self {
        Self::Raw(TokenAmount::from(v))
    }
}

/// One swap attempt. Lives for a single orchestration run.
///
/// `min_amount_out` defaults to zero, which gives no slippage protection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub amount_in: AmountInput,
    pub min_amount_out: TokenAmount,
}

impl SwapRequest {
    pub fn new(amount_in: impl Into<AmountInput>) -> Self {
        Self {
            amount_in: amount_in.into(),
            min_amount_out: TokenAmount::zero(),
        }
    }

    pub fn with_min_amount_out(mut self, min_amount_out: TokenAmount) -> Self {
        self.min_amount_out = min_amount_out;
        self
    }
}

/// One add-liquidity attempt; `amount_a` is in the configured token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub amount_a: AmountInput,
    pub amount_b: AmountInput,
}

impl DepositRequest {
    pub fn new(amount_a: impl Into<AmountInput>, amount_b: impl Into<AmountInput>) -> Self {
        Self {
            amount_a: amount_a.into(),
            amount_b: amount_b.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_min_out_is_zero() {
        let request = SwapRequest::new(500u64);
        assert_eq!(request.min_amount_out, TokenAmount::zero());
        assert_eq!(request.amount_in, AmountInput::Raw(TokenAmount::from(500u64)));
    }

    #[test]
    fn test_resolve_rejects_zero() {
        assert_eq!(AmountInput::from(0u64).resolve(18), Err(AmountError::Zero));
        assert_eq!(AmountInput::human("0.0").resolve(18), Err(AmountError::Zero));
        // Truncation can make a tiny amount zero.
        assert_eq!(AmountInput::human("0.0001").resolve(2), Err(AmountError::Zero));
    }

    #[test]
    fn test_validate_needs_no_decimals() {
        assert_eq!(AmountInput::from(0u64).validate(), Err(AmountError::Zero));
        assert_eq!(AmountInput::from(7u64).validate(), Ok(()));
        assert_eq!(AmountInput::human("1.5").validate(), Ok(()));
        assert!(matches!(
            AmountInput::human("abc").validate(),
            Err(AmountError::NotNumeric(_))
        ));
        assert!(matches!(
            AmountInput::human("-2").validate(),
            Err(AmountError::Signed(_))
        ));
        assert_eq!(AmountInput::human("  ").validate(), Err(AmountError::Empty));
    }

    #[test]
    fn test_resolve_human() {
        let input = AmountInput::human("1.25");
        assert!(input.needs_decimals());
        assert_eq!(input.resolve(2), Ok(TokenAmount::from(125u64)));
    }
}
