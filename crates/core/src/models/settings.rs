use serde::{Deserialize, Serialize};
use tracing::warn;

use super::currency::CurrencyCode;
use super::pricing::{DEFAULT_CLIENT_VAT_RATE, DEFAULT_COMMISSION_RATE};
use super::rate::RateSource;
use crate::errors::CoreError;

/// Colour scheme preference. Stored only; rendering is up to the frontend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// User-configurable settings, persisted in the local cache.
///
/// Every field has a default, so a partially stored object (older version,
/// hand-edited cache) merges over the defaults instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: Theme,

    /// Currency selected when a new session starts.
    pub default_currency: CurrencyCode,

    /// Fraction, e.g. 0.15
    pub default_commission_rate: f64,

    /// Fraction in `[0, 1]`
    pub default_client_vat_rate: f64,

    /// Preferred exchange-rate provider; Frankfurter is the fallback either way.
    pub rate_source: RateSource,

    /// Record a history entry automatically after each completed calculation.
    pub auto_save: bool,

    pub notifications: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            default_currency: CurrencyCode::Eur,
            default_commission_rate: DEFAULT_COMMISSION_RATE,
            default_client_vat_rate: DEFAULT_CLIENT_VAT_RATE,
            rate_source: RateSource::Frankfurter,
            auto_save: true,
            notifications: true,
        }
    }
}

/// A partial settings change; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub default_currency: Option<CurrencyCode>,
    pub default_commission_rate: Option<f64>,
    pub default_client_vat_rate: Option<f64>,
    pub rate_source: Option<RateSource>,
    pub auto_save: Option<bool>,
    pub notifications: Option<bool>,
}

impl AppSettings {
    /// Apply a partial update. Nothing changes if any provided value is out of range.
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<(), CoreError> {
        if let Some(commission) = update.default_commission_rate {
            if !is_valid_commission(commission) {
                return Err(CoreError::ValidationError(format!(
                    "Default commission must be a non-negative fraction, got {commission}"
                )));
            }
        }
        if let Some(vat) = update.default_client_vat_rate {
            if !is_valid_client_vat(vat) {
                return Err(CoreError::ValidationError(format!(
                    "Default VAT rate must be between 0 and 1, got {vat}"
                )));
            }
        }

        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(currency) = update.default_currency {
            self.default_currency = currency;
        }
        if let Some(commission) = update.default_commission_rate {
            self.default_commission_rate = commission;
        }
        if let Some(vat) = update.default_client_vat_rate {
            self.default_client_vat_rate = vat;
        }
        if let Some(source) = update.rate_source {
            self.rate_source = source;
        }
        if let Some(auto_save) = update.auto_save {
            self.auto_save = auto_save;
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
        Ok(())
    }

    /// Settings read from an untrusted source (the local cache) with every
    /// out-of-range rate replaced by its default. Other fields are kept.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if !is_valid_commission(self.default_commission_rate) {
            warn!(
                value = self.default_commission_rate,
                "stored default commission out of range, using default"
            );
            self.default_commission_rate = DEFAULT_COMMISSION_RATE;
        }
        if !is_valid_client_vat(self.default_client_vat_rate) {
            warn!(
                value = self.default_client_vat_rate,
                "stored default VAT rate out of range, using default"
            );
            self.default_client_vat_rate = DEFAULT_CLIENT_VAT_RATE;
        }
        self
    }
}

fn is_valid_commission(commission: f64) -> bool {
    commission.is_finite() && commission >= 0.0
}

fn is_valid_client_vat(vat: f64) -> bool {
    vat.is_finite() && (0.0..=1.0).contains(&vat)
}
