use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Currencies a listing can be priced in. The domestic side is always PLN.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Eur,
    Usd,
    Gbp,
    Chf,
    Nok,
    Sek,
    Dkk,
}

impl CurrencyCode {
    /// Every supported listing currency, in display order.
    pub const ALL: [CurrencyCode; 7] = [
        CurrencyCode::Eur,
        CurrencyCode::Usd,
        CurrencyCode::Gbp,
        CurrencyCode::Chf,
        CurrencyCode::Nok,
        CurrencyCode::Sek,
        CurrencyCode::Dkk,
    ];

    /// ISO 4217 code, e.g. "EUR".
    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Nok => "NOK",
            CurrencyCode::Sek => "SEK",
            CurrencyCode::Dkk => "DKK",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Usd => "US Dollar",
            CurrencyCode::Gbp => "British Pound",
            CurrencyCode::Chf => "Swiss Franc",
            CurrencyCode::Nok => "Norwegian Krone",
            CurrencyCode::Sek => "Swedish Krona",
            CurrencyCode::Dkk => "Danish Krone",
        }
    }

    /// Hard-coded PLN price of one unit of this currency, used when every
    /// rate provider is unreachable.
    pub fn default_quote(&self) -> f64 {
        match self {
            CurrencyCode::Eur => 4.3,
            CurrencyCode::Usd => 3.9,
            CurrencyCode::Gbp => 5.0,
            CurrencyCode::Chf => 4.2,
            CurrencyCode::Nok => 0.37,
            CurrencyCode::Sek => 0.36,
            CurrencyCode::Dkk => 0.58,
        }
    }

    /// Fallback exchange rate in engine units (foreign currency per 1 PLN),
    /// i.e. the reciprocal of [`CurrencyCode::default_quote`].
    pub fn default_rate(&self) -> f64 {
        1.0 / self.default_quote()
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = CoreError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        CurrencyCode::ALL
            .iter()
            .copied()
            .find(|c| c.code() == upper)
            .ok_or_else(|| CoreError::UnsupportedCurrency(s.trim().to_string()))
    }
}
