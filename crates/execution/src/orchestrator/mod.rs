//! Allowance-gated swap orchestration.
//!
//! A run moves through the phases in [`SwapPhase`]:
//! - Validate and normalize the requested amount
//! - Read the current allowance for the pool
//! - Approve and wait for confirmation when the allowance is short
//! - Submit the pool write and wait for confirmation
//! - Refresh pool state when the ledger may have changed

mod executor;
mod in_flight;
mod phase;

pub use executor::*;
pub use phase::*;
