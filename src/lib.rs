//! ledgerbank Library
//!
//! Multi-currency retail banking ledger engine: customers, policy-typed
//! accounts, append-only transaction ledgers, atomic cross-currency
//! transfers, and the capabilities (rates, tokens) the bank consumes.

pub mod account;
pub mod analytics;
pub mod audit;
pub mod auth;
pub mod bank;
pub mod customer;
pub mod domain;
pub mod rates;

// Private modules (used only by the demo binary)
pub mod config;
mod error;

pub use account::{Account, AccountKind, Statement};
pub use analytics::CustomerAnalytics;
pub use bank::{Bank, TransferReceipt};
pub use config::Config;
pub use customer::Customer;
pub use error::{BankError, BankResult};
pub use domain::{Amount, AmountError, Currency, Transaction, TransactionKind};
