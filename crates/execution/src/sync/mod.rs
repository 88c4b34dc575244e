//! State synchronization with the ledger.
//!
//! Every refresh is a fresh query; nothing read here is reused as input to
//! a later decision.

mod synchronizer;

pub use synchronizer::*;
