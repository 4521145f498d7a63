//! Domain module
//!
//! Core domain types and business logic.

pub mod currency;
pub mod money;
pub mod transaction;

pub use currency::Currency;
pub use money::{Amount, AmountError};
pub use transaction::{Transaction, TransactionKind};
