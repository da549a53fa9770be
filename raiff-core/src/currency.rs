//! Statement currencies supported by the Raiffeisen templates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency of one statement. The set is closed: the bank only issues
/// statements in these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rsd,
    Eur,
    Usd,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported currency code: {0:?}")]
pub struct UnknownCurrency(pub String);

impl Currency {
    /// All currencies in merge/report order
    pub const ALL: [Currency; 3] = [Currency::Rsd, Currency::Eur, Currency::Usd];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rsd => "RSD",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RSD" => Ok(Currency::Rsd),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(UnknownCurrency(other.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
