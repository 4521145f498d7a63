//! Ledger transactions
//!
//! Transactions are immutable facts that have happened to an account.
//! The sign of the amount encodes direction: withdrawals are negative.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Currency;

/// What kind of balance-affecting event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Interest,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Interest => "interest",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in an account's ledger.
///
/// Immutable once created. The ledger is the source of truth for an
/// account's balance: the balance is exactly the sum of all transaction
/// amounts ever appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    amount: Decimal,
    kind: TransactionKind,
    currency: Currency,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(amount: Decimal, kind: TransactionKind, currency: Currency) -> Self {
        Self {
            amount,
            kind,
            currency,
            timestamp: Utc::now(),
        }
    }

    /// Signed amount; withdrawals are negative.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>10} {}{} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            if self.amount.is_sign_negative() { "" } else { "+" },
            self.amount,
            self.currency.code(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::new("USD", "US Dollar", "$")
    }

    #[test]
    fn test_transaction_kind_as_str() {
        assert_eq!(TransactionKind::Deposit.as_str(), "deposit");
        assert_eq!(TransactionKind::Withdrawal.as_str(), "withdrawal");
        assert_eq!(TransactionKind::Interest.as_str(), "interest");
    }

    #[test]
    fn test_transaction_display_signs() {
        let dep = Transaction::new(Decimal::new(500, 0), TransactionKind::Deposit, usd());
        let wd = Transaction::new(Decimal::new(-200, 0), TransactionKind::Withdrawal, usd());

        assert!(dep.to_string().contains("+500"));
        assert!(wd.to_string().contains("-200"));
        assert!(wd.to_string().contains("USD"));
    }
}
