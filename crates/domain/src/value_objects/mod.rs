pub mod amount;

pub use amount::{Amount, check_decimal_syntax, to_human_units, to_minor_units};
