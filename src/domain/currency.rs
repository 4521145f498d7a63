//! Currency type
//!
//! Immutable description of a currency. Identity is the ISO-style code;
//! name and symbol are display metadata only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A currency recognized by the bank.
///
/// Two currencies are equal iff their codes match exactly; two accounts are
/// "same-currency" under the same rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    name: String,
    symbol: String,
}

impl Currency {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
