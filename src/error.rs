//! Error handling module
//!
//! Centralized error taxonomy for the ledger engine. Every variant is a
//! recoverable, caller-facing condition carrying the offending identifier
//! or amounts; nothing here is process-fatal.

use rust_decimal::Decimal;

use crate::domain::AmountError;
use crate::rates::RateSourceError;

/// Crate-wide Result type
pub type BankResult<T> = Result<T, BankError>;

/// Ledger engine error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BankError {
    #[error("Insufficient funds in account {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Duplicate account number: {0}")]
    DuplicateAccount(String),

    #[error("A customer is already registered for email: {0}")]
    DuplicateCustomer(String),

    #[error("Unrecognized currency: {0}")]
    InvalidCurrency(String),

    #[error("No exchange rate available from {from} to {to}")]
    RateUnavailable { from: String, to: String },

    #[error("Invalid account type: {0}")]
    InvalidAccountType(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Cannot transfer from an account to itself: {0}")]
    SameAccountTransfer(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    RateSource(#[from] RateSourceError),
}

impl BankError {
    /// Create an insufficient funds error.
    pub fn insufficient_funds(
        account: impl Into<String>,
        requested: Decimal,
        available: Decimal,
    ) -> Self {
        Self::InsufficientFunds {
            account: account.into(),
            requested,
            available,
        }
    }

    /// Stable machine-readable code, used in logs and audit detail.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::AccountNotFound(_) => "account_not_found",
            Self::CustomerNotFound(_) => "customer_not_found",
            Self::DuplicateAccount(_) => "duplicate_account",
            Self::DuplicateCustomer(_) => "duplicate_customer",
            Self::InvalidCurrency(_) => "invalid_currency",
            Self::RateUnavailable { .. } => "rate_unavailable",
            Self::InvalidAccountType(_) => "invalid_account_type",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::SameAccountTransfer(_) => "same_account_transfer",
            Self::Amount(_) => "invalid_amount",
            Self::RateSource(_) => "rate_source_unavailable",
        }
    }

    /// Check if this is a not-found error (lookup miss rather than a rule
    /// violation).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::CustomerNotFound(_)
                | Self::RateUnavailable { .. }
        )
    }
}
