//! Errors raised by ledger reads, writes and wallet requests.

use thiserror::Error;

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193 "the requested account has not been authorized".
pub const UNAUTHORIZED_CODE: i64 = 4100;
/// JSON-RPC code used by nodes for `execution reverted`.
pub const EXECUTION_REVERTED_CODE: i64 = 3;
/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Failure talking to the ledger or the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The request never produced a JSON-RPC response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The node answered with an error object that is not classified below.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message, with any revert data appended.
        message: String,
    },
    /// The signer declined the request.
    #[error("rejected by signer: {0}")]
    Rejected(String),
    /// The ledger program reverted.
    #[error("execution reverted: {0}")]
    Reverted(String),
    /// The response did not have the expected shape.
    #[error("malformed ledger response: {0}")]
    Decode(String),
    /// A write was attempted through an unsigned binding.
    #[error("no signing identity bound to this program")]
    NoSigner,
}

impl LedgerError {
    /// Classifies a JSON-RPC error object.
    #[must_use]
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();

        if code == USER_REJECTED_CODE
            || code == UNAUTHORIZED_CODE
            || lower.contains("user denied")
            || lower.contains("user rejected")
        {
            Self::Rejected(message)
        } else if code == EXECUTION_REVERTED_CODE || lower.contains("revert") {
            Self::Reverted(message)
        } else {
            Self::Rpc { code, message }
        }
    }

    /// True if the signer declined.
    #[must_use]
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// True if the ledger program reverted.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted(_))
    }

    /// True for JSON-RPC "method not found".
    #[must_use]
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == METHOD_NOT_FOUND_CODE)
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_user_rejection() {
        let err = LedgerError::from_rpc(4001, "MetaMask Tx Signature: User denied transaction");
        assert!(err.is_user_rejection());
        assert!(LedgerError::from_rpc(-32000, "user rejected the request").is_user_rejection());
    }

    #[test]
    fn test_classifies_revert() {
        let err = LedgerError::from_rpc(3, "execution reverted: INSUFFICIENT_OUTPUT");
        assert!(err.is_revert());
        assert!(
            LedgerError::from_rpc(-32603, "VM Exception while processing transaction: revert")
                .is_revert()
        );
    }

    #[test]
    fn test_unclassified_stays_rpc() {
        let err = LedgerError::from_rpc(-32601, "method not found");
        assert!(err.is_method_not_found());
        assert!(!err.is_revert());
        assert_eq!(err.to_string(), "rpc error -32601: method not found");
    }
}
