//! Ledger bindings for the AMM swap client.
//!
//! This crate talks to an EVM-compatible node over JSON-RPC:
//! - Token program reads and approvals
//! - Pool reserve reads, swaps and deposits
//! - Wallet account authorization
//! - Bounded confirmation waiting

/// Prelude module for convenient imports.
pub mod prelude;

/// Call data encoding.
pub mod abi;
/// Signer-bound program proxies.
pub mod bindings;
/// Receipts and confirmation waiting.
pub mod confirmation;
/// Ledger error type.
pub mod error;
/// Pool program binding.
pub mod pool;
/// JSON-RPC provider.
pub mod rpc;
/// Token program binding.
pub mod token;
/// Wallet capability.
pub mod wallet;
