//! Analytics
//!
//! Derived, read-only views over a customer's accounts. Nothing here
//! mutates ledger state; the bank feeds this module per-account snapshots
//! taken under the same locks used for mutation.

use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregate figures across one customer's accounts.
///
/// `total_balance` sums balances across accounts *without* currency
/// conversion; with mixed-currency accounts the figure is a plain numeric
/// sum. The conversion-aware variant lives behind a separate bank
/// operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerAnalytics {
    pub total_balance: Decimal,
    pub total_transaction_count: u64,
    pub average_transaction_amount: Decimal,
}

impl CustomerAnalytics {
    /// Fold per-account `(balance, transaction_count)` snapshots into the
    /// aggregate. The average is total balance over transaction count,
    /// zero when no transactions exist.
    pub fn compute(snapshots: impl IntoIterator<Item = (Decimal, usize)>) -> Self {
        let mut total_balance = Decimal::ZERO;
        let mut total_transaction_count = 0u64;

        for (balance, count) in snapshots {
            total_balance += balance;
            total_transaction_count += count as u64;
        }

        let average_transaction_amount = if total_transaction_count == 0 {
            Decimal::ZERO
        } else {
            total_balance / Decimal::from(total_transaction_count)
        };

        Self {
            total_balance,
            total_transaction_count,
            average_transaction_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compute_basic() {
        let analytics =
            CustomerAnalytics::compute(vec![(dec!(1000), 2), (dec!(500), 3)]);

        assert_eq!(analytics.total_balance, dec!(1500));
        assert_eq!(analytics.total_transaction_count, 5);
        assert_eq!(analytics.average_transaction_amount, dec!(300));
    }

    #[test]
    fn test_compute_no_transactions_zero_average() {
        let analytics = CustomerAnalytics::compute(vec![(dec!(1000), 0)]);

        assert_eq!(analytics.total_balance, dec!(1000));
        assert_eq!(analytics.total_transaction_count, 0);
        assert_eq!(analytics.average_transaction_amount, Decimal::ZERO);
    }

    #[test]
    fn test_compute_empty() {
        let analytics = CustomerAnalytics::compute(Vec::new());
        assert_eq!(analytics.total_balance, Decimal::ZERO);
        assert_eq!(analytics.average_transaction_amount, Decimal::ZERO);
    }
}
