use crate::token::TokenAmount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Point-in-time holdings of the pool's two assets, in minor units.
///
/// Replaced wholesale on every read; the client never adjusts it locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub reserve_a: TokenAmount,
    pub reserve_b: TokenAmount,
}

impl PoolReserves {
    pub fn new(reserve_a: TokenAmount, reserve_b: TokenAmount) -> Self {
        Self {
            reserve_a,
            reserve_b,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reserve_a.is_zero() || self.reserve_b.is_zero()
    }

    /// Display-only ratio `reserve_b / reserve_a` in raw units.
    ///
    /// `None` when either side is zero or exceeds the `Decimal` range.
    pub fn spot_price(&self) -> Option<Decimal> {
        if self.is_empty() {
            return None;
        }
        let r_a = Decimal::from_str(&self.reserve_a.to_string()).ok()?;
        let r_b = Decimal::from_str(&self.reserve_b.to_string()).ok()?;
        r_b.checked_div(r_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_spot_price() {
        let reserves = PoolReserves::new(TokenAmount::from(2000u64), TokenAmount::from(1000u64));
        assert_eq!(reserves.spot_price(), Some(dec!(0.5)));
    }

    #[test]
    fn test_spot_price_empty_pool() {
        let reserves = PoolReserves::new(TokenAmount::zero(), TokenAmount::from(1000u64));
        assert!(reserves.is_empty());
        assert_eq!(reserves.spot_price(), None);
    }

    #[test]
    fn test_spot_price_out_of_decimal_range() {
        let huge = TokenAmount::from_dec_str(&"9".repeat(60)).unwrap();
        let reserves = PoolReserves::new(huge, TokenAmount::from(1u64));
        assert_eq!(reserves.spot_price(), None);
    }
}
