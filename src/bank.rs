//! Bank
//!
//! Orchestration root: the single authority that registers customers,
//! opens accounts, drives the transfer protocol, and computes analytics.
//! The bank holds no balances itself; account state lives behind
//! per-account mutexes shared between the bank-wide index and the owning
//! customer.
//!
//! Lock discipline: customer map before account map, map locks released
//! before account mutexes are taken, account mutexes in account-number
//! order, rate-table locks last. External capabilities (rate source, token
//! issuer) are awaited while no lock is held.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::account::{Account, AccountKind, Statement};
use crate::analytics::CustomerAnalytics;
use crate::audit::{AuditAction, AuditLog};
use crate::auth::{AccessToken, CustomerId, TokenIssuer};
use crate::config::Config;
use crate::customer::{AccountHandle, Customer};
use crate::domain::{Amount, Currency, Transaction};
use crate::error::{BankError, BankResult};
use crate::rates::{ExchangeRateTable, RateSource, RateSourceError};

/// Number of digits in a generated account number.
const ACCOUNT_NUMBER_DIGITS: u32 = 10;

/// Outcome of a completed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub transfer_id: Uuid,
    pub from_account: String,
    pub to_account: String,
    /// Amount withdrawn from the source, in the source currency.
    pub amount: Decimal,
    /// Amount deposited into the destination, in the destination currency.
    pub converted_amount: Decimal,
    pub rate: Decimal,
    pub executed_at: DateTime<Utc>,
}

/// The ledger root.
pub struct Bank {
    config: Config,
    currencies: RwLock<HashMap<String, Currency>>,
    customers: RwLock<HashMap<CustomerId, Customer>>,
    accounts: RwLock<HashMap<String, AccountHandle>>,
    rates: ExchangeRateTable,
    audit: AuditLog,
}

impl Bank {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            currencies: RwLock::new(HashMap::new()),
            customers: RwLock::new(HashMap::new()),
            accounts: RwLock::new(HashMap::new()),
            rates: ExchangeRateTable::new(),
            audit: AuditLog::new(),
        }
    }

    // =========================================================================
    // Currencies
    // =========================================================================

    /// Idempotent upsert into the recognized-currency set.
    pub fn add_currency(&self, code: &str, name: &str, symbol: &str) {
        let currency = Currency::new(code, name, symbol);
        let inserted = self
            .currencies
            .write()
            .insert(code.to_string(), currency)
            .is_none();

        if inserted {
            tracing::debug!(code, "Currency recognized");
            self.audit
                .record(AuditAction::CurrencyAdded, &json!({ "code": code }));
        }
    }

    pub fn currency(&self, code: &str) -> BankResult<Currency> {
        self.currencies
            .read()
            .get(code)
            .cloned()
            .ok_or_else(|| BankError::InvalidCurrency(code.to_string()))
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Onboard a customer. The id is derived from the email; registering
    /// the same email twice is rejected rather than silently merged.
    pub fn register_customer(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password: &str,
    ) -> BankResult<CustomerId> {
        let customer = Customer::new(name, email, phone, password);
        let id = customer.id().clone();

        let mut customers = self.customers.write();
        if customers.contains_key(&id) {
            return Err(BankError::DuplicateCustomer(email.to_string()));
        }
        customers.insert(id.clone(), customer);
        drop(customers);

        tracing::info!(customer = %id, "Customer registered");
        self.audit.record(
            AuditAction::CustomerRegistered,
            &json!({ "customer": &id, "name": name }),
        );
        Ok(id)
    }

    pub fn customer_account_numbers(&self, id: &CustomerId) -> BankResult<Vec<String>> {
        let customers = self.customers.read();
        let customer = customers
            .get(id)
            .ok_or_else(|| BankError::CustomerNotFound(id.to_string()))?;
        Ok(customer.account_numbers())
    }

    // =========================================================================
    // Account opening
    // =========================================================================

    /// Open an account of the given variant tag with its default policy
    /// parameters.
    pub fn create_account(
        &self,
        customer_id: &CustomerId,
        account_type: &str,
        currency_code: &str,
        initial_balance: Decimal,
    ) -> BankResult<String> {
        let kind = AccountKind::from_tag(account_type)?;
        self.create_account_with(customer_id, kind, currency_code, initial_balance)
    }

    /// Open an account with an explicit withdrawal policy.
    pub fn create_account_with(
        &self,
        customer_id: &CustomerId,
        kind: AccountKind,
        currency_code: &str,
        initial_balance: Decimal,
    ) -> BankResult<String> {
        let currency = self.currency(currency_code)?;

        let mut customers = self.customers.write();
        let customer = customers
            .get_mut(customer_id)
            .ok_or_else(|| BankError::CustomerNotFound(customer_id.to_string()))?;

        let mut accounts = self.accounts.write();
        let number = Self::fresh_account_number(&accounts);
        let account = Account::open(number.clone(), currency, kind.clone(), initial_balance)?;
        let handle: AccountHandle = Arc::new(parking_lot::Mutex::new(account));

        customer.add_account(Arc::clone(&handle))?;
        accounts.insert(number.clone(), handle);
        drop(accounts);
        drop(customers);

        tracing::info!(
            account = %number,
            customer = %customer_id,
            kind = kind.tag(),
            currency = currency_code,
            "Account opened"
        );
        self.audit.record(
            AuditAction::AccountCreated,
            &json!({
                "account": &number,
                "customer": customer_id,
                "type": kind.tag(),
                "currency": currency_code,
                "initial_balance": initial_balance,
            }),
        );
        Ok(number)
    }

    /// Generate a bank-unique account number. A collision with an existing
    /// number is retryable, so keep drawing until a free one comes up.
    fn fresh_account_number(accounts: &HashMap<String, AccountHandle>) -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        loop {
            let digits: u64 = rng.gen_range(0..10u64.pow(ACCOUNT_NUMBER_DIGITS));
            let candidate = format!("LB-{digits:010}");
            if !accounts.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn account_handle(&self, number: &str) -> BankResult<AccountHandle> {
        self.accounts
            .read()
            .get(number)
            .cloned()
            .ok_or_else(|| BankError::AccountNotFound(number.to_string()))
    }

    // =========================================================================
    // Ledger operations
    // =========================================================================

    pub fn deposit(&self, account_number: &str, amount: Amount) -> BankResult<Transaction> {
        let handle = self.account_handle(account_number)?;
        let tx = handle.lock().deposit(amount);
        tracing::debug!(account = account_number, amount = %amount, "Deposit recorded");
        Ok(tx)
    }

    pub fn withdraw(&self, account_number: &str, amount: Amount) -> BankResult<Transaction> {
        let handle = self.account_handle(account_number)?;
        let tx = handle.lock().withdraw(amount)?;
        tracing::debug!(account = account_number, amount = %amount, "Withdrawal recorded");
        Ok(tx)
    }

    /// Accrue interest on a savings account.
    pub fn apply_interest(&self, account_number: &str) -> BankResult<Transaction> {
        let handle = self.account_handle(account_number)?;
        let tx = handle.lock().apply_interest()?;

        tracing::info!(account = account_number, interest = %tx.amount(), "Interest applied");
        self.audit.record(
            AuditAction::InterestApplied,
            &json!({ "account": account_number, "interest": tx.amount() }),
        );
        Ok(tx)
    }

    /// Point-in-time statement for an account.
    pub fn statement(&self, account_number: &str) -> BankResult<Statement> {
        let handle = self.account_handle(account_number)?;
        let statement = handle.lock().statement();
        Ok(statement)
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Atomically move value between two accounts, converting currency when
    /// they differ.
    ///
    /// Both account locks are held across both legs, ordered by account
    /// number so opposing transfers cannot deadlock. Every precondition
    /// (rate lookup included) is checked before the first mutation; once
    /// the withdrawal commits, the deposit cannot fail, so no observer can
    /// see one leg without the other.
    pub fn transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: Amount,
    ) -> BankResult<TransferReceipt> {
        if from_account == to_account {
            return Err(BankError::SameAccountTransfer(from_account.to_string()));
        }

        let from_handle = self.account_handle(from_account)?;
        let to_handle = self.account_handle(to_account)?;

        // fixed global order: lower account number first
        let (mut from, mut to) = if from_account < to_account {
            let from = from_handle.lock();
            let to = to_handle.lock();
            (from, to)
        } else {
            let to = to_handle.lock();
            let from = from_handle.lock();
            (from, to)
        };

        // same-currency transfers skip the rate lookup entirely
        let rate = if from.currency() == to.currency() {
            Decimal::ONE
        } else {
            self.rates.rate(from.currency().code(), to.currency().code())?
        };
        let converted = amount.convert(rate)?;

        from.withdraw(amount)?;
        to.deposit(converted);

        let receipt = TransferReceipt {
            transfer_id: Uuid::new_v4(),
            from_account: from_account.to_string(),
            to_account: to_account.to_string(),
            amount: amount.value(),
            converted_amount: converted.value(),
            rate,
            executed_at: Utc::now(),
        };
        drop(to);
        drop(from);

        tracing::info!(
            transfer = %receipt.transfer_id,
            from = from_account,
            to = to_account,
            amount = %receipt.amount,
            converted = %receipt.converted_amount,
            "Transfer executed"
        );
        self.audit.record(AuditAction::TransferExecuted, &receipt);
        Ok(receipt)
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Aggregate figures across a customer's accounts. Balances are summed
    /// without currency conversion; see `generate_analytics_in` for the
    /// conversion-aware variant.
    pub fn generate_analytics(&self, customer_id: &CustomerId) -> BankResult<CustomerAnalytics> {
        let customers = self.customers.read();
        let customer = customers
            .get(customer_id)
            .ok_or_else(|| BankError::CustomerNotFound(customer_id.to_string()))?;

        let snapshots: Vec<(Decimal, usize)> = customer
            .accounts()
            .map(|handle| {
                let account = handle.lock();
                (account.balance(), account.ledger().len())
            })
            .collect();

        Ok(CustomerAnalytics::compute(snapshots))
    }

    /// Aggregate figures with every balance converted into the target
    /// currency through the rate table. A missing pair fails the whole
    /// computation rather than silently mixing currencies.
    pub fn generate_analytics_in(
        &self,
        customer_id: &CustomerId,
        target_currency: &str,
    ) -> BankResult<CustomerAnalytics> {
        self.currency(target_currency)?;

        let customers = self.customers.read();
        let customer = customers
            .get(customer_id)
            .ok_or_else(|| BankError::CustomerNotFound(customer_id.to_string()))?;

        let mut snapshots = Vec::new();
        for handle in customer.accounts() {
            let account = handle.lock();
            let rate = self.rates.rate(account.currency().code(), target_currency)?;
            let converted = (account.balance() * rate).round_dp(8);
            snapshots.push((converted, account.ledger().len()));
        }

        Ok(CustomerAnalytics::compute(snapshots))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Verify credentials and issue a signed, time-limited token. Unknown
    /// emails and wrong passwords are indistinguishable to the caller.
    pub async fn login<T: TokenIssuer>(
        &self,
        email: &str,
        password: &str,
        issuer: &T,
    ) -> BankResult<AccessToken> {
        let id = CustomerId::from_email(email);

        let verified = {
            let customers = self.customers.read();
            customers
                .get(&id)
                .map(|customer| customer.verify_password(password))
                .unwrap_or(false)
        };

        if !verified {
            tracing::warn!(customer = %id, "Login rejected");
            self.audit.record(
                AuditAction::LoginAttempt,
                &json!({ "customer": &id, "outcome": "invalid_credentials" }),
            );
            return Err(BankError::AuthenticationFailed(
                "invalid email or password".to_string(),
            ));
        }

        // token issuance is external I/O; no lock is held here
        let token = issuer
            .issue(&id, self.config.token_ttl())
            .await
            .map_err(|e| BankError::AuthenticationFailed(e.to_string()))?;

        tracing::info!(customer = %id, "Login succeeded");
        self.audit.record(
            AuditAction::LoginAttempt,
            &json!({ "customer": &id, "outcome": "success" }),
        );
        Ok(token)
    }

    /// Resolve a presented token back to a known customer.
    pub async fn authenticate<T: TokenIssuer>(
        &self,
        token: &AccessToken,
        issuer: &T,
    ) -> BankResult<CustomerId> {
        let id = issuer
            .verify(token)
            .await
            .map_err(|e| BankError::AuthenticationFailed(e.to_string()))?;

        if !self.customers.read().contains_key(&id) {
            return Err(BankError::AuthenticationFailed(
                "token does not match a known customer".to_string(),
            ));
        }
        Ok(id)
    }

    // =========================================================================
    // Exchange rates
    // =========================================================================

    /// Refresh the rate table for one base currency from an external
    /// source, bounded by the configured timeout. The fetched set is
    /// filtered to recognized currencies and validated in full; the table
    /// is swapped atomically or not at all.
    pub async fn refresh_rates<S: RateSource>(&self, source: &S, base: &str) -> BankResult<()> {
        self.currency(base)?;

        let fetched = tokio::time::timeout(
            self.config.rate_fetch_timeout(),
            source.fetch_rates(base),
        )
        .await
        .map_err(|_| {
            RateSourceError::Unavailable(format!(
                "rate fetch for {base} timed out after {:?}",
                self.config.rate_fetch_timeout()
            ))
        })??;

        let recognized = self.currencies.read();
        let filtered: HashMap<String, Decimal> = fetched
            .into_iter()
            .filter(|(code, _)| recognized.contains_key(code))
            .collect();
        drop(recognized);

        if filtered.is_empty() {
            return Err(RateSourceError::Malformed(format!(
                "refresh for {base} contained no recognized currencies"
            ))
            .into());
        }

        let pairs = filtered.len();
        self.rates.replace_base(base, filtered)?;

        tracing::info!(base, pairs, "Exchange rates refreshed");
        self.audit.record(
            AuditAction::RatesRefreshed,
            &json!({ "base": base, "pairs": pairs }),
        );
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn rates(&self) -> &ExchangeRateTable {
        &self.rates
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
