//! Domain types for the AMM swap client.
//!
//! - Ledger addresses and minor-unit token amounts
//! - Human/minor-unit amount conversion
//! - Pool reserve snapshots
//! - Swap and deposit requests

/// Ledger addresses.
pub mod address;
/// Domain error types.
pub mod error;
/// Pool reserve snapshots.
pub mod pool;
/// Swap and deposit requests.
pub mod swap;
/// Minor-unit token amounts.
pub mod token;
/// Value objects.
pub mod value_objects;

pub use address::Address;
pub use error::{AddressError, AmountError};
pub use pool::PoolReserves;
pub use swap::{AmountInput, DepositRequest, SwapRequest};
pub use token::{DEFAULT_DECIMALS, MAX_DECIMALS, TokenAmount};
pub use value_objects::amount::{Amount, check_decimal_syntax, to_human_units, to_minor_units};
