//! Amount type
//!
//! Domain primitive for monetary amounts with business rule validation.
//! All amounts are validated at construction time, ensuring invalid values
//! cannot exist in the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Maximum allowed amount for a single operation
const MAX_AMOUNT: &str = "1000000000000";

/// Maximum decimal places (8)
pub(crate) const MAX_SCALE: u32 = 8;

/// Amount represents a validated monetary value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 8 decimal places
/// - Maximum value is 1 trillion units
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use ledgerbank::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(100, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(100, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 8 decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        // Rule 1: Must be positive
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        // Rule 2: Maximum 8 decimal places
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        // Rule 3: Upper bound
        let max = Decimal::from_str(MAX_AMOUNT).expect("Invalid MAX_AMOUNT constant");
        if value > max {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Create an Amount from an integer (no decimal places).
    pub fn from_integer(value: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::from(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if this amount can be added to another without overflow.
    pub fn try_add(&self, other: &Amount) -> Result<Amount, AmountError> {
        let sum = self.0 + other.0;
        Amount::new(sum)
    }

    /// Multiply by a positive factor (an exchange rate), normalizing the
    /// result back to the allowed scale.
    pub fn convert(&self, rate: Decimal) -> Result<Amount, AmountError> {
        let product = (self.0 * rate).round_dp(MAX_SCALE).normalize();
        Amount::new(product)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s)
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::from_str(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

impl Add for Amount {
    type Output = Result<Amount, AmountError>;

    fn add(self, rhs: Self) -> Self::Output {
        self.try_add(&rhs)
    }
}

// Note: We don't implement Sub because the result might be <= 0.
// Balances are plain Decimals and subtraction happens under the
// account's floor check.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(Decimal::new(100, 0));
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().value(), Decimal::new(100, 0));
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = Amount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(Decimal::new(-100, 0));
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        // 0.123456789 has 9 decimal places
        let amount = Amount::new(Decimal::new(123456789, 9));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(9))));
    }

    #[test]
    fn test_amount_max_decimals_ok() {
        // 0.12345678 has 8 decimal places
        let amount = Amount::new(Decimal::new(12345678, 8));
        assert!(amount.is_ok());
    }

    #[test]
    fn test_amount_overflow() {
        // 1 trillion + 1
        let value = Decimal::from_str("1000000000001").unwrap();
        let amount = Amount::new(value);
        assert!(matches!(amount, Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Result<Amount, _> = "123.456".parse();
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().value(), Decimal::new(123456, 3));
    }

    #[test]
    fn test_amount_try_add() {
        let a = Amount::new(Decimal::new(100, 0)).unwrap();
        let b = Amount::new(Decimal::new(50, 0)).unwrap();
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.value(), Decimal::new(150, 0));
    }

    #[test]
    fn test_amount_convert() {
        let a = Amount::new(Decimal::new(300, 0)).unwrap();
        let converted = a.convert(Decimal::new(9, 1)).unwrap();
        assert_eq!(converted.value(), Decimal::new(270, 0));
    }

    #[test]
    fn test_amount_convert_rounds_to_scale() {
        let a = Amount::new(Decimal::new(1, 0)).unwrap();
        // 1 * 0.333333333333 rounds back to 8 places
        let rate = Decimal::from_str("0.333333333333").unwrap();
        let converted = a.convert(rate).unwrap();
        assert!(converted.value().scale() <= MAX_SCALE);
    }
}
