//! Error types for domain value parsing.

use thiserror::Error;

/// Reasons a human-entered or raw amount is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The input was empty or only whitespace.
    #[error("amount is empty")]
    Empty,
    /// The input carried a sign; amounts are unsigned.
    #[error("amount must not be signed: {0:?}")]
    Signed(String),
    /// The input contained something other than digits and one decimal point.
    #[error("amount is not a decimal number: {0:?}")]
    NotNumeric(String),
    /// The value does not fit in 256 bits once scaled to minor units.
    #[error("amount {0:?} overflows 256-bit minor units")]
    Overflow(String),
    /// The decimal count cannot be represented as a power of ten in 256 bits.
    #[error("unsupported decimal count {0} (maximum is {max})", max = crate::token::MAX_DECIMALS)]
    UnsupportedDecimals(u8),
    /// The amount must be strictly positive for this operation.
    #[error("amount must be greater than zero")]
    Zero,
}

/// Reasons an address string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Missing `0x` prefix.
    #[error("address must start with 0x: {0:?}")]
    MissingPrefix(String),
    /// Wrong number of hex digits.
    #[error("address must have 40 hex digits, got {0}")]
    Length(usize),
    /// A character outside `[0-9a-fA-F]`.
    #[error("address contains a non-hex character: {0:?}")]
    NotHex(String),
}
