//! Swap orchestration for a constant-product AMM pool.
//!
//! This crate sequences ledger writes for one user session:
//! - Identity resolution through a wallet capability
//! - Allowance-gated swaps and deposits with bounded confirmation
//! - Read-through refresh of reserves and balance
//! - Per-run reports with phase history

/// Prelude module for convenient imports.
pub mod prelude;

/// Failure taxonomy.
pub mod error;
/// Identity resolution.
pub mod identity;
/// Run reports and phase events.
pub mod lifecycle;
/// Allowance-gated orchestration.
pub mod orchestrator;
/// Session facade.
pub mod session;
/// Pool state synchronization.
pub mod sync;
