//! Ledger account and program addresses.

use crate::error::AddressError;
use primitive_types::H160;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 20-byte ledger address.
///
/// Parsed from and rendered as `0x`-prefixed lowercase hex. The all-zero
/// address is the placeholder used by unconfigured deployments.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(pub H160);

impl Address {
    /// The all-zero placeholder address.
    pub const ZERO: Address = Address(H160([0u8; 20]));

    /// Wraps raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(H160(bytes))
    }

    /// Raw big-endian bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0.0
    }

    /// True for the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(trimmed.to_string()))?;

        if digits.len() != 40 {
            return Err(AddressError::Length(digits.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| AddressError::NotHex(trimmed.to_string()))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<H160> for Address {
    fn from(h: H160) -> Self {
        Self(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let addr: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
        assert_eq!(
            addr.to_string(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
        assert!(!addr.is_zero());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let addr: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x5fbdb2315678afecb367f032d93f642f64180aa3\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_zero_placeholder() {
        let addr: Address = "0x0000000000000000000000000000000000000000".parse().unwrap();
        assert!(addr.is_zero());
        assert_eq!(addr, Address::ZERO);
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Address::default(), Address::ZERO);
        assert!(Address::default().is_zero());
    }

    #[test]
    fn test_accepts_uppercase_prefix_and_digits() {
        let addr: Address = "0X5FBDB2315678AFECB367F032D93F642F64180AA3".parse().unwrap();
        assert_eq!(
            addr.to_string(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(
            "5fbdb2315678afecb367f032d93f642f64180aa3".parse::<Address>(),
            Err(AddressError::MissingPrefix(
                "5fbdb2315678afecb367f032d93f642f64180aa3".to_string()
            ))
        );
        assert_eq!("0x1234".parse::<Address>(), Err(AddressError::Length(4)));
        assert!(matches!(
            "0xzzbdb2315678afecb367f032d93f642f64180aa3".parse::<Address>(),
            Err(AddressError::NotHex(_))
        ));
    }
}
