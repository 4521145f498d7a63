//! Customer
//!
//! A customer owns profile data, a password hash, and the set of accounts
//! registered under their identity. Account state is shared with the bank's
//! account index through the same `Arc`, so per-account locking is uniform
//! no matter which side performs the access.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::account::Account;
use crate::auth::{CustomerId, PasswordHash};
use crate::error::{BankError, BankResult};

/// Shared, independently lockable account handle.
pub type AccountHandle = Arc<Mutex<Account>>;

/// A registered customer and their accounts.
#[derive(Debug)]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: String,
    phone: String,
    password: PasswordHash,
    accounts: BTreeMap<String, AccountHandle>,
    created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer. The id is derived from the email, so the same
    /// email always maps to the same customer.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: &str,
    ) -> Self {
        let email = email.into();
        Self {
            id: CustomerId::from_email(&email),
            name: name.into(),
            email,
            phone: phone.into(),
            password: PasswordHash::new(password),
            accounts: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register an account under its account number.
    pub fn add_account(&mut self, account: AccountHandle) -> BankResult<()> {
        let number = account.lock().number().to_string();
        if self.accounts.contains_key(&number) {
            return Err(BankError::DuplicateAccount(number));
        }
        self.accounts.insert(number, account);
        Ok(())
    }

    /// Look up one of this customer's accounts.
    pub fn account(&self, number: &str) -> BankResult<&AccountHandle> {
        self.accounts
            .get(number)
            .ok_or_else(|| BankError::AccountNotFound(number.to_string()))
    }

    /// All account handles, ordered by account number.
    pub fn accounts(&self) -> impl Iterator<Item = &AccountHandle> {
        self.accounts.values()
    }

    pub fn account_numbers(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Compare a candidate password against the stored hash. The plaintext
    /// is never stored and never logged.
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
