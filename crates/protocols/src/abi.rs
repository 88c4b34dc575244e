//! Call data encoding for the token and pool programs.
//!
//! Each call is a 4-byte selector followed by 32-byte big-endian words.
//! Only the static types these programs use are supported: `address`,
//! `uint256` and `uint8`.

use crate::error::LedgerError;
use amm_swap_domain::{Address, TokenAmount};
use primitive_types::U256;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// `balanceOf(address)`
pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
/// `allowance(address,address)`
pub const ALLOWANCE: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];
/// `approve(address,uint256)`
pub const APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
/// `decimals()`
pub const DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
/// `getReserves()`
pub const GET_RESERVES: [u8; 4] = [0x09, 0x02, 0xf1, 0xac];
/// `swapExactTokensForTokens(uint256,uint256)`
pub const SWAP_EXACT_TOKENS_FOR_TOKENS: [u8; 4] = [0x78, 0x13, 0x82, 0x42];
/// `addLiquidity(uint256,uint256)`
pub const ADD_LIQUIDITY: [u8; 4] = [0x9c, 0xd4, 0x41, 0xda];

/// A single ABI argument.
#[derive(Debug, Clone, Copy)]
pub enum Token {
    Address(Address),
    Uint(U256),
}

impl From<Address> for Token {
    fn from(a: Address) -> Self {
        Self::Address(a)
    }
}

impl From<TokenAmount> for Token {
    fn from(a: TokenAmount) -> Self {
        Self::Uint(a.0)
    }
}

/// Builds call data for `selector(args...)`.
#[must_use]
pub fn encode_call(selector: [u8; 4], args: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD * args.len());
    data.extend_from_slice(&selector);
    for arg in args {
        data.extend_from_slice(&encode_word(arg));
    }
    data
}

fn encode_word(token: &Token) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(addr) => word[12..].copy_from_slice(addr.as_bytes()),
        Token::Uint(value) => {
            // `U256::byte` indexes from the least significant end.
            for (i, slot) in word.iter_mut().enumerate() {
                *slot = value.byte(WORD - 1 - i);
            }
        }
    }
    word
}

/// Reads the `index`-th word of a return payload as `uint256`.
///
/// # Errors
/// Returns `LedgerError::Decode` when the payload is too short.
pub fn decode_uint(data: &[u8], index: usize) -> Result<U256, LedgerError> {
    let start = index * WORD;
    let word = data.get(start..start + WORD).ok_or_else(|| {
        LedgerError::Decode(format!(
            "expected at least {} bytes of return data, got {}",
            start + WORD,
            data.len()
        ))
    })?;
    Ok(U256::from_big_endian(word))
}

/// Reads the `index`-th word as `uint8`, rejecting values above 255.
///
/// # Errors
/// Returns `LedgerError::Decode` for short payloads or out-of-range values.
pub fn decode_u8(data: &[u8], index: usize) -> Result<u8, LedgerError> {
    let value = decode_uint(data, index)?;
    if value > U256::from(u8::MAX) {
        return Err(LedgerError::Decode(format!("{value} does not fit in uint8")));
    }
    Ok(value.low_u64() as u8)
}

/// `0x`-prefixed lowercase hex.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes `0x`-prefixed hex. `"0x"` decodes to an empty payload.
///
/// # Errors
/// Returns `LedgerError::Decode` for odd lengths or non-hex characters.
pub fn from_hex(s: &str) -> Result<Vec<u8>, LedgerError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| LedgerError::Decode(format!("invalid hex data {s:?}: {e}")))
}

/// Parses a JSON-RPC hex quantity such as `"0x1b4"`.
///
/// # Errors
/// Returns `LedgerError::Decode` for malformed quantities.
pub fn parse_quantity(s: &str) -> Result<U256, LedgerError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::Decode(format!("quantity without 0x prefix: {s:?}")))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LedgerError::Decode(format!("invalid quantity: {s:?}")));
    }
    U256::from_str_radix(digits, 16).map_err(|e| LedgerError::Decode(format!("{s:?}: {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_encode_approve() {
        let spender = addr("0xe7f1725e7734ce288f8367e1bb143e90bb3f0512");
        let data = encode_call(
            APPROVE,
            &[spender.into(), TokenAmount::from(500u64).into()],
        );
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(
            to_hex(&data),
            "0x095ea7b3\
             000000000000000000000000e7f1725e7734ce288f8367e1bb143e90bb3f0512\
             00000000000000000000000000000000000000000000000000000000000001f4"
        );
    }

    #[test]
    fn test_encode_no_args() {
        assert_eq!(encode_call(GET_RESERVES, &[]), GET_RESERVES.to_vec());
    }

    #[test]
    fn test_encode_max_uint() {
        let data = encode_call(SWAP_EXACT_TOKENS_FOR_TOKENS, &[Token::Uint(U256::MAX)]);
        assert!(data[4..].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_decode_words() {
        let mut payload = vec![0u8; 64];
        payload[31] = 0x64; // 100
        payload[63] = 0xc8; // 200
        assert_eq!(decode_uint(&payload, 0).unwrap(), U256::from(100));
        assert_eq!(decode_uint(&payload, 1).unwrap(), U256::from(200));
        assert!(matches!(
            decode_uint(&payload, 2),
            Err(LedgerError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_u8_range() {
        let mut payload = vec![0u8; 32];
        payload[31] = 18;
        assert_eq!(decode_u8(&payload, 0).unwrap(), 18);
        payload[30] = 1;
        assert!(decode_u8(&payload, 0).is_err());
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(from_hex("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(from_hex("0x0a0b").unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(from_hex("0xABff").unwrap(), vec![0xab, 0xff]);
        assert_eq!(to_hex(&[0xab, 0x01]), "0xab01");
        assert!(from_hex("0xabc").is_err());
        assert!(from_hex("0xzz").is_err());
        assert_eq!(parse_quantity("0x1b4").unwrap(), U256::from(436));
        assert!(parse_quantity("1b4").is_err());
        assert!(parse_quantity("0x").is_err());
    }
}
