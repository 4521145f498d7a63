//! Exchange rates
//!
//! Directional (from, to) -> rate lookup with timestamped entries, plus the
//! external rate-source capability used to refresh it. Rates are never
//! derived: no inverse, no transitive hops. A missing pair is a hard
//! failure even when the inverse pair exists.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

use crate::error::{BankError, BankResult};

/// One stored conversion rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub rate: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Failures reported by an external rate source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateSourceError {
    #[error("rate source unavailable: {0}")]
    Unavailable(String),

    #[error("rate source returned malformed data: {0}")]
    Malformed(String),
}

/// Capability for fetching current rates from an external provider.
pub trait RateSource {
    fn fetch_rates(
        &self,
        base: &str,
    ) -> impl Future<Output = Result<HashMap<String, Decimal>, RateSourceError>> + Send;
}

/// In-memory rate source with fixed answers, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct FixedRateSource {
    rates: HashMap<(String, String), Decimal>,
}

impl FixedRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

impl RateSource for FixedRateSource {
    async fn fetch_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, RateSourceError> {
        let out: HashMap<String, Decimal> = self
            .rates
            .iter()
            .filter(|((from, _), _)| from == base)
            .map(|((_, to), rate)| (to.clone(), *rate))
            .collect();

        if out.is_empty() {
            return Err(RateSourceError::Unavailable(format!(
                "no rates for base {base}"
            )));
        }
        Ok(out)
    }
}

/// Directional conversion-rate table.
#[derive(Debug, Default)]
pub struct ExchangeRateTable {
    entries: RwLock<HashMap<(String, String), RateEntry>>,
}

impl ExchangeRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored directional rate. The identity pair always answers `1`
    /// without consulting the table.
    pub fn rate(&self, from: &str, to: &str) -> BankResult<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        self.entries
            .read()
            .get(&(from.to_string(), to.to_string()))
            .map(|entry| entry.rate)
            .ok_or_else(|| BankError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// The full entry, including its observation timestamp.
    pub fn entry(&self, from: &str, to: &str) -> Option<RateEntry> {
        self.entries
            .read()
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    /// Upsert a single directional rate. The rate must be positive.
    pub fn set_rate(&self, from: &str, to: &str, rate: Decimal) -> BankResult<()> {
        if rate <= Decimal::ZERO {
            return Err(BankError::InvalidCurrency(format!(
                "rate {from}->{to} must be positive, got {rate}"
            )));
        }

        self.entries.write().insert(
            (from.to_string(), to.to_string()),
            RateEntry {
                rate,
                observed_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Replace every entry for `base` with the given set, atomically: the
    /// new set is validated in full before the single write-lock swap, so a
    /// rejected refresh leaves the table exactly as it was.
    pub fn replace_base(&self, base: &str, rates: HashMap<String, Decimal>) -> BankResult<()> {
        let observed_at = Utc::now();
        let mut staged = Vec::with_capacity(rates.len());
        for (to, rate) in rates {
            if rate <= Decimal::ZERO {
                return Err(BankError::InvalidCurrency(format!(
                    "rate {base}->{to} must be positive, got {rate}"
                )));
            }
            staged.push(((base.to_string(), to), RateEntry { rate, observed_at }));
        }

        let mut entries = self.entries.write();
        entries.retain(|(from, _), _| from != base);
        entries.extend(staged);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
