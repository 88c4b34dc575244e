//! Orchestration run lifecycle.
//!
//! Records each run of the orchestrator:
//! - Phase changes with timestamps
//! - Submitted transaction hashes
//! - The terminal status and post-run snapshot

mod events;
mod report;

pub use events::*;
pub use report::*;
