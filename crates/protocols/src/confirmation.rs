//! Transaction hashes, receipts and bounded confirmation waiting.
//!
//! A write call only proves submission. Callers wait here for a receipt
//! before treating its effect as real.

use crate::abi::from_hex;
use crate::error::LedgerError;
use async_trait::async_trait;
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Hash identifying a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub H256);

impl FromStr for TxHash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = from_hex(s)?;
        if bytes.len() != 32 {
            return Err(LedgerError::Decode(format!(
                "transaction hash must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(H256::from_slice(&bytes)))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// False if the program reverted.
    pub success: bool,
    /// Gas consumed.
    pub gas_used: Option<u64>,
}

/// Source of transaction receipts.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Returns the receipt, or `None` while the transaction is pending.
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, LedgerError>;
}

/// Why a submitted transaction did not confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxFailure {
    /// Mined with a failed status.
    Reverted(TransactionReceipt),
    /// No receipt within the wait bound. The transaction may still land.
    Timeout(Duration),
}

/// Lifecycle of one write operation, as seen by one receipt query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Accepted by the node, not yet mined.
    Submitted(TxHash),
    /// Mined successfully.
    Confirmed(TransactionReceipt),
    /// Did not confirm.
    Failed(TxFailure),
}

/// Polls a [`ReceiptSource`] until a receipt arrives or the bound elapses.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationWaiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl ConfirmationWaiter {
    /// Shortest poll interval accepted.
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

    /// Creates a waiter.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval: poll_interval.max(Self::MIN_POLL_INTERVAL),
        }
    }

    /// Configured wait bound.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current outcome of `hash` from a single receipt query.
    ///
    /// # Errors
    /// Propagates the receipt query failure.
    pub async fn check(
        source: &dyn ReceiptSource,
        hash: TxHash,
    ) -> Result<TransactionOutcome, LedgerError> {
        Ok(match source.transaction_receipt(hash).await? {
            None => TransactionOutcome::Submitted(hash),
            Some(receipt) if receipt.success => TransactionOutcome::Confirmed(receipt),
            Some(receipt) => TransactionOutcome::Failed(TxFailure::Reverted(receipt)),
        })
    }

    /// Waits for `hash` to be mined.
    ///
    /// Errors from individual receipt queries are logged and polling
    /// continues; only the overall bound ends the wait.
    ///
    /// # Errors
    /// `TxFailure::Reverted` for a failed receipt, `TxFailure::Timeout`
    /// when nothing was mined within the bound.
    pub async fn wait(
        &self,
        source: &dyn ReceiptSource,
        hash: TxHash,
    ) -> Result<TransactionReceipt, TxFailure> {
        let started = Instant::now();

        let poll = async {
            let mut ticker = tokio::time::interval(self.poll_interval);
            let mut attempts: u32 = 0;
            loop {
                ticker.tick().await;
                attempts += 1;
                match Self::check(source, hash).await {
                    Ok(TransactionOutcome::Submitted(_)) => {
                        debug!(tx = %hash, attempts, "Transaction pending");
                    }
                    Ok(TransactionOutcome::Confirmed(receipt)) => return Ok(receipt),
                    Ok(TransactionOutcome::Failed(failure)) => return Err(failure),
                    Err(e) => warn!(tx = %hash, error = %e, "Receipt query failed"),
                }
            }
        };

        let outcome = tokio::time::timeout(self.timeout, poll)
            .await
            .unwrap_or(Err(TxFailure::Timeout(self.timeout)));
        if let Ok(receipt) = &outcome {
            debug!(
                tx = %hash,
                block = ?receipt.block_number,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Transaction confirmed"
            );
        }
        outcome
    }
}

impl Default for ConfirmationWaiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(120), Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn hash(n: u8) -> TxHash {
        TxHash(H256::repeat_byte(n))
    }

    struct Scripted {
        pending_polls: u32,
        success: bool,
        polls: AtomicU32,
        fail_first: Mutex<bool>,
    }

    impl Scripted {
        fn new(pending_polls: u32, success: bool) -> Self {
            Self {
                pending_polls,
                success,
                polls: AtomicU32::new(0),
                fail_first: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl ReceiptSource for Scripted {
        async fn transaction_receipt(
            &self,
            hash: TxHash,
        ) -> Result<Option<TransactionReceipt>, LedgerError> {
            {
                let mut fail = self.fail_first.lock().unwrap();
                if *fail {
                    *fail = false;
                    return Err(LedgerError::Transport("connection reset".into()));
                }
            }
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            if n < self.pending_polls {
                return Ok(None);
            }
            Ok(Some(TransactionReceipt {
                hash,
                block_number: Some(7),
                success: self.success,
                gas_used: None,
            }))
        }
    }

    fn fast_waiter(timeout_ms: u64) -> ConfirmationWaiter {
        ConfirmationWaiter::new(Duration::from_millis(timeout_ms), Duration::from_millis(2))
    }

    #[test]
    fn test_tx_hash_round_trip() {
        let s = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
        let h: TxHash = s.parse().unwrap();
        assert_eq!(h.to_string(), s);
        assert!("0x1234".parse::<TxHash>().is_err());
    }

    #[tokio::test]
    async fn test_confirms_after_pending_polls() {
        let source = Scripted::new(3, true);
        let outcome = fast_waiter(1_000).wait(&source, hash(1)).await;
        assert_eq!(outcome.map(|r| r.block_number), Ok(Some(7)));
        assert_eq!(source.polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let source = Scripted::new(0, false);
        let outcome = fast_waiter(1_000).wait(&source, hash(2)).await;
        assert!(matches!(outcome, Err(TxFailure::Reverted(_))));
    }

    #[tokio::test]
    async fn test_times_out_when_never_mined() {
        let source = Scripted::new(u32::MAX, true);
        let outcome = fast_waiter(30).wait(&source, hash(3)).await;
        assert_eq!(outcome, Err(TxFailure::Timeout(Duration::from_millis(30))));
    }

    #[tokio::test]
    async fn test_query_errors_do_not_end_wait() {
        let source = Scripted::new(0, true);
        *source.fail_first.lock().unwrap() = true;
        let outcome = fast_waiter(1_000).wait(&source, hash(4)).await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_check_reports_each_stage() {
        let pending = Scripted::new(1, true);
        let first = ConfirmationWaiter::check(&pending, hash(5)).await.unwrap();
        assert_eq!(first, TransactionOutcome::Submitted(hash(5)));
        let second = ConfirmationWaiter::check(&pending, hash(5)).await.unwrap();
        assert!(matches!(second, TransactionOutcome::Confirmed(_)));

        let reverted = Scripted::new(0, false);
        assert!(matches!(
            ConfirmationWaiter::check(&reverted, hash(6)).await,
            Ok(TransactionOutcome::Failed(TxFailure::Reverted(_)))
        ));

        let broken = Scripted::new(0, true);
        *broken.fail_first.lock().unwrap() = true;
        assert!(ConfirmationWaiter::check(&broken, hash(7)).await.is_err());
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let waiter = ConfirmationWaiter::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(waiter.poll_interval, ConfirmationWaiter::MIN_POLL_INTERVAL);
    }
}
