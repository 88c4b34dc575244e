//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use amm_swap_execution::prelude::*;
//! ```

// Errors
pub use crate::error::SwapError;

// Identity
pub use crate::identity::{Identity, IdentityResolver};

// Lifecycle
pub use crate::lifecycle::{OperationKind, PhaseChange, SwapReport};

// Orchestrator
pub use crate::orchestrator::{OrchestratorConfig, SwapOrchestrator, SwapPhase, approval_required};

// Session
pub use crate::session::SwapSession;

// Sync
pub use crate::sync::{PoolSnapshot, PoolStateSynchronizer};
