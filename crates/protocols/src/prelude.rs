//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use amm_swap_protocols::prelude::*;
//! ```

pub use crate::bindings::{LedgerConnector, ProgramAddresses, ProgramBindings, RpcConnector};
pub use crate::confirmation::{
    ConfirmationWaiter, ReceiptSource, TransactionOutcome, TransactionReceipt, TxFailure, TxHash,
};
pub use crate::error::LedgerError;
pub use crate::pool::{AmmPool, PoolProgram};
pub use crate::rpc::{HttpTransport, RpcConfig, RpcProvider, RpcTransport};
pub use crate::token::{Erc20Token, TokenProgram};
pub use crate::wallet::{RpcWallet, WalletCapability};
