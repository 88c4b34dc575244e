//! Conversion between human decimal strings and minor-unit integers.
//!
//! Excess fractional precision is truncated toward zero, so a converted
//! amount never exceeds what the user typed.

use crate::error::AmountError;
use crate::token::{MAX_DECIMALS, TokenAmount};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A minor-unit amount paired with the decimal count used to display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub raw: TokenAmount,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: TokenAmount, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Parses a human decimal string into minor units.
    pub fn parse(human: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self::new(to_minor_units(human, decimals)?, decimals))
    }

    /// Human decimal rendering of the raw value.
    pub fn to_human(&self) -> String {
        to_human_units(self.raw, self.decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_human())
    }
}

/// `10^decimals` as a 256-bit integer.
///
/// # Errors
/// Returns `UnsupportedDecimals` above [`MAX_DECIMALS`].
pub fn pow10(decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }
    let ten = U256::from(10u8);
    let mut acc = U256::one();
    for _ in 0..decimals {
        acc = acc
            .checked_mul(ten)
            .ok_or(AmountError::UnsupportedDecimals(decimals))?;
    }
    Ok(acc)
}

/// Checks that `human` is an unsigned decimal string without scaling it.
///
/// Accepts the same forms as [`to_minor_units`], so a string that passes
/// here can only fail conversion with `Overflow` or `UnsupportedDecimals`.
///
/// # Errors
/// Returns `Empty`, `Signed` or `NotNumeric`.
pub fn check_decimal_syntax(human: &str) -> Result<(), AmountError> {
    split_decimal(human.trim()).map(|_| ())
}

fn split_decimal(input: &str) -> Result<(&str, &str), AmountError> {
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') || input.starts_with('+') {
        return Err(AmountError::Signed(input.to_string()));
    }

    let (int_part, frac_part) = input.split_once('.').unwrap_or((input, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) || (int_part.is_empty() && frac_part.is_empty())
    {
        return Err(AmountError::NotNumeric(input.to_string()));
    }
    Ok((int_part, frac_part))
}

/// Converts a human decimal string such as `"1.5"` into minor units.
///
/// Accepts `12`, `12.5`, `.5` and `12.` (surrounding whitespace ignored).
/// Fractional digits beyond `decimals` are dropped.
///
/// # Errors
/// Returns an [`AmountError`] for empty, signed, non-numeric or overflowing
/// input, and for decimal counts that cannot be represented.
pub fn to_minor_units(human: &str, decimals: u8) -> Result<TokenAmount, AmountError> {
    let input = human.trim();
    let (int_part, frac_part) = split_decimal(input)?;

    let scale = pow10(decimals)?;
    let overflow = || AmountError::Overflow(input.to_string());

    let whole = if int_part.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(int_part).map_err(|_| overflow())?
    };

    let kept = &frac_part[..frac_part.len().min(decimals as usize)];
    let fraction = if kept.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{kept:0<width$}", width = decimals as usize);
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    whole
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(fraction))
        .map(TokenAmount)
        .ok_or_else(overflow)
}

/// Renders minor units as a canonical human decimal string.
///
/// Trailing fractional zeros are removed: `1500` with 3 decimals is `"1.5"`,
/// `2000` is `"2"`, `5` is `"0.005"`.
pub fn to_human_units(amount: TokenAmount, decimals: u8) -> String {
    let digits = amount.0.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{digits:0>width$}", width = decimals + 1)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
