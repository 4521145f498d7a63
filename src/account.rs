//! Account
//!
//! An account owns a running balance and its append-only transaction
//! ledger. The ledger is the source of truth: the balance is a cached fold
//! of it, and every mutation goes through a single record step so the two
//! can never diverge.
//!
//! Savings and Checking differ only in their withdrawal floor, carried as a
//! policy value on `AccountKind` rather than duplicated withdrawal logic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::money::MAX_SCALE;
use crate::domain::{Amount, Currency, Transaction, TransactionKind};
use crate::error::{BankError, BankResult};

/// Interest rate used when a savings account is opened by type tag only.
const DEFAULT_INTEREST_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Overdraft limit used when a checking account is opened by type tag only.
const DEFAULT_OVERDRAFT_LIMIT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Withdrawal policy for the two account variants.
///
/// The floor is the only varying parameter between Savings and Checking:
/// a withdrawal may never take the balance below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountKind {
    Savings { interest_rate: Decimal },
    Checking { overdraft_limit: Decimal },
}

impl AccountKind {
    /// Savings policy. The interest rate must be non-negative.
    pub fn savings(interest_rate: Decimal) -> BankResult<Self> {
        if interest_rate < Decimal::ZERO {
            return Err(BankError::InvalidAccountType(format!(
                "savings interest rate must be >= 0, got {interest_rate}"
            )));
        }
        Ok(Self::Savings { interest_rate })
    }

    /// Checking policy. The overdraft limit must be non-negative.
    pub fn checking(overdraft_limit: Decimal) -> BankResult<Self> {
        if overdraft_limit < Decimal::ZERO {
            return Err(BankError::InvalidAccountType(format!(
                "checking overdraft limit must be >= 0, got {overdraft_limit}"
            )));
        }
        Ok(Self::Checking { overdraft_limit })
    }

    /// Resolve a variant tag with the default policy parameters.
    pub fn from_tag(tag: &str) -> BankResult<Self> {
        match tag {
            "savings" => Ok(Self::Savings {
                interest_rate: DEFAULT_INTEREST_RATE,
            }),
            "checking" => Ok(Self::Checking {
                overdraft_limit: DEFAULT_OVERDRAFT_LIMIT,
            }),
            other => Err(BankError::InvalidAccountType(other.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Savings { .. } => "savings",
            Self::Checking { .. } => "checking",
        }
    }

    /// The minimum balance a withdrawal may leave behind.
    pub fn floor(&self) -> Decimal {
        match self {
            Self::Savings { .. } => Decimal::ZERO,
            Self::Checking { overdraft_limit } => -*overdraft_limit,
        }
    }
}

/// A customer account: fixed currency, running balance, append-only ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    number: String,
    currency: Currency,
    kind: AccountKind,
    balance: Decimal,
    ledger: Vec<Transaction>,
}

impl Account {
    /// Open an account. A non-zero initial balance is recorded as an opening
    /// transaction, so the ledger-sum invariant holds from the first
    /// instant; a negative opening balance goes through the same floor check
    /// as any withdrawal.
    pub fn open(
        number: impl Into<String>,
        currency: Currency,
        kind: AccountKind,
        initial_balance: Decimal,
    ) -> BankResult<Self> {
        let mut account = Self {
            number: number.into(),
            currency,
            kind,
            balance: Decimal::ZERO,
            ledger: Vec::new(),
        };

        if initial_balance > Decimal::ZERO {
            account.deposit(Amount::new(initial_balance)?);
        } else if initial_balance < Decimal::ZERO {
            account.withdraw(Amount::new(-initial_balance)?)?;
        }

        Ok(account)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Deposit money. Never fails for a validated positive amount.
    pub fn deposit(&mut self, amount: Amount) -> Transaction {
        self.record(amount.value(), TransactionKind::Deposit)
    }

    /// Withdraw money. Fails when the withdrawal would take the balance
    /// below the variant's floor; on failure nothing is mutated.
    pub fn withdraw(&mut self, amount: Amount) -> BankResult<Transaction> {
        let floor = self.kind.floor();
        if self.balance - amount.value() < floor {
            return Err(BankError::insufficient_funds(
                self.number.clone(),
                amount.value(),
                self.balance - floor,
            ));
        }

        Ok(self.record(-amount.value(), TransactionKind::Withdrawal))
    }

    /// Accrue interest on a savings account:
    /// `interest = balance * interest_rate`, recorded as a single Interest
    /// transaction. Fails on checking accounts.
    pub fn apply_interest(&mut self) -> BankResult<Transaction> {
        let rate = match &self.kind {
            AccountKind::Savings { interest_rate } => *interest_rate,
            AccountKind::Checking { .. } => {
                return Err(BankError::InvalidAccountType(self.kind.tag().to_string()));
            }
        };

        let interest = (self.balance * rate).round_dp(MAX_SCALE).normalize();
        Ok(self.record(interest, TransactionKind::Interest))
    }

    /// The single point through which every balance change flows: appends
    /// the transaction and folds its signed amount into the balance.
    fn record(&mut self, signed_amount: Decimal, kind: TransactionKind) -> Transaction {
        let tx = Transaction::new(signed_amount, kind, self.currency.clone());
        self.balance += tx.amount();
        self.ledger.push(tx.clone());
        tx
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Headroom above the floor, i.e. the largest amount a withdrawal could
    /// currently take.
    pub fn available(&self) -> Decimal {
        self.balance - self.kind.floor()
    }

    pub fn ledger(&self) -> &[Transaction] {
        &self.ledger
    }

    /// Render the ledger as an ordered, human-readable statement with a
    /// running balance per line. Read-only.
    pub fn statement(&self) -> Statement {
        let mut running = Decimal::ZERO;
        let lines = self
            .ledger
            .iter()
            .map(|tx| {
                running += tx.amount();
                StatementLine {
                    transaction: tx.clone(),
                    balance_after: running,
                }
            })
            .collect();

        Statement {
            account_number: self.number.clone(),
            currency: self.currency.clone(),
            lines,
            closing_balance: self.balance,
        }
    }
}

/// One statement row: a transaction and the balance it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    pub transaction: Transaction,
    pub balance_after: Decimal,
}

/// Point-in-time rendering of an account's ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub account_number: String,
    pub currency: Currency,
    pub lines: Vec<StatementLine>,
    pub closing_balance: Decimal,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Statement for {} ({})",
            self.account_number,
            self.currency.code()
        )?;
        for line in &self.lines {
            writeln!(
                f,
                "  {}  => {} {}",
                line.transaction,
                line.balance_after,
                self.currency.symbol()
            )?;
        }
        write!(
            f,
            "  closing balance: {} {}",
            self.closing_balance,
            self.currency.symbol()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD", "US Dollar", "$")
    }

    fn eur() -> Currency {
        Currency::new("EUR", "Euro", "€")
    }

    fn savings(initial: Decimal) -> Account {
        Account::open(
            "SAV-1",
            usd(),
            AccountKind::Savings {
                interest_rate: dec!(0.01),
            },
            initial,
        )
        .unwrap()
    }

    fn checking(initial: Decimal, overdraft: Decimal) -> Account {
        Account::open(
            "CHK-1",
            eur(),
            AccountKind::Checking {
                overdraft_limit: overdraft,
            },
            initial,
        )
        .unwrap()
    }

    fn ledger_sum(account: &Account) -> Decimal {
        account.ledger().iter().map(|tx| tx.amount()).sum()
    }

    #[test]
    fn test_open_records_opening_deposit() {
        let account = savings(dec!(1000));
        assert_eq!(account.balance(), dec!(1000));
        assert_eq!(account.ledger().len(), 1);
        assert_eq!(account.ledger()[0].kind(), TransactionKind::Deposit);
        assert_eq!(ledger_sum(&account), account.balance());
    }

    #[test]
    fn test_open_zero_balance_empty_ledger() {
        let account = savings(Decimal::ZERO);
        assert_eq!(account.balance(), Decimal::ZERO);
        assert!(account.ledger().is_empty());
    }

    #[test]
    fn test_open_negative_within_overdraft() {
        let account = checking(dec!(-50), dec!(100));
        assert_eq!(account.balance(), dec!(-50));
        assert_eq!(account.ledger().len(), 1);
        assert_eq!(account.ledger()[0].kind(), TransactionKind::Withdrawal);
        assert_eq!(ledger_sum(&account), account.balance());
    }

    #[test]
    fn test_open_below_floor_rejected() {
        let result = Account::open(
            "CHK-2",
            eur(),
            AccountKind::Checking {
                overdraft_limit: dec!(100),
            },
            dec!(-200),
        );
        assert!(matches!(result, Err(BankError::InsufficientFunds { .. })));
    }

    #[test]
    fn test_deposit_grows_balance_and_ledger() {
        let mut account = savings(dec!(1000));
        let tx = account.deposit(Amount::new(dec!(500)).unwrap());

        assert_eq!(tx.amount(), dec!(500));
        assert_eq!(account.balance(), dec!(1500));
        assert_eq!(account.ledger().len(), 2);
        assert_eq!(ledger_sum(&account), account.balance());
    }

    #[test]
    fn test_savings_withdraw_floor_is_zero() {
        let mut account = savings(dec!(100));
        let err = account.withdraw(Amount::new(dec!(101)).unwrap()).unwrap_err();

        assert!(matches!(
            err,
            BankError::InsufficientFunds { available, .. } if available == dec!(100)
        ));
        // no partial mutation
        assert_eq!(account.balance(), dec!(100));
        assert_eq!(account.ledger().len(), 1);

        account.withdraw(Amount::new(dec!(100)).unwrap()).unwrap();
        assert_eq!(account.balance(), Decimal::ZERO);
    }

    #[test]
    fn test_checking_withdraw_into_overdraft() {
        let mut account = checking(dec!(500), dec!(100));
        account.withdraw(Amount::new(dec!(200)).unwrap()).unwrap();
        assert_eq!(account.balance(), dec!(300));

        // down to the floor exactly
        account.withdraw(Amount::new(dec!(400)).unwrap()).unwrap();
        assert_eq!(account.balance(), dec!(-100));

        // one cent past the floor fails
        let err = account.withdraw(Amount::new(dec!(0.01)).unwrap()).unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));
        assert_eq!(account.balance(), dec!(-100));
        assert_eq!(ledger_sum(&account), account.balance());
    }

    #[test]
    fn test_checking_overdraft_failure_example() {
        let mut account = checking(dec!(300), dec!(100));
        let err = account.withdraw(Amount::new(dec!(500)).unwrap()).unwrap_err();

        assert!(matches!(
            err,
            BankError::InsufficientFunds { requested, available, .. }
                if requested == dec!(500) && available == dec!(400)
        ));
        assert_eq!(account.balance(), dec!(300));
        assert_eq!(account.ledger().len(), 1);
    }

    #[test]
    fn test_apply_interest_on_savings() {
        let mut account = savings(dec!(1500));
        let tx = account.apply_interest().unwrap();

        assert_eq!(tx.kind(), TransactionKind::Interest);
        assert_eq!(tx.amount(), dec!(15));
        assert_eq!(account.balance(), dec!(1515));
        assert_eq!(ledger_sum(&account), account.balance());
    }

    #[test]
    fn test_apply_interest_rejected_on_checking() {
        let mut account = checking(dec!(500), dec!(100));
        let err = account.apply_interest().unwrap_err();
        assert!(matches!(err, BankError::InvalidAccountType(_)));
        assert_eq!(account.ledger().len(), 1);
    }

    #[test]
    fn test_kind_from_tag() {
        assert!(matches!(
            AccountKind::from_tag("savings"),
            Ok(AccountKind::Savings { .. })
        ));
        assert!(matches!(
            AccountKind::from_tag("checking"),
            Ok(AccountKind::Checking { .. })
        ));
        assert!(matches!(
            AccountKind::from_tag("brokerage"),
            Err(BankError::InvalidAccountType(_))
        ));
    }

    #[test]
    fn test_negative_policy_parameters_rejected() {
        assert!(AccountKind::savings(dec!(-0.01)).is_err());
        assert!(AccountKind::checking(dec!(-1)).is_err());
        assert!(AccountKind::savings(Decimal::ZERO).is_ok());
        assert!(AccountKind::checking(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_balance_matches_ledger_over_random_sequence() {
        // cheap linear congruential generator keeps the sequence deterministic
        let mut seed: u64 = 0x2545F491;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as i64
        };

        let mut account = checking(dec!(1000), dec!(250));
        for _ in 0..200 {
            let raw = next() % 400 + 1;
            let amount = Amount::new(Decimal::from(raw.abs().max(1))).unwrap();
            if next() % 2 == 0 {
                account.deposit(amount);
            } else {
                // failures must leave no trace; successes must respect the floor
                let _ = account.withdraw(amount);
            }
            assert_eq!(ledger_sum(&account), account.balance());
            assert!(account.balance() >= account.kind().floor());
        }
    }

    #[test]
    fn test_statement_running_balance() {
        let mut account = savings(dec!(1000));
        account.deposit(Amount::new(dec!(500)).unwrap());
        account.withdraw(Amount::new(dec!(300)).unwrap()).unwrap();

        let statement = account.statement();
        assert_eq!(statement.lines.len(), 3);
        assert_eq!(statement.lines[0].balance_after, dec!(1000));
        assert_eq!(statement.lines[1].balance_after, dec!(1500));
        assert_eq!(statement.lines[2].balance_after, dec!(1200));
        assert_eq!(statement.closing_balance, dec!(1200));

        let rendered = statement.to_string();
        assert!(rendered.contains("SAV-1"));
        assert!(rendered.contains("closing balance: 1200"));
    }
}
