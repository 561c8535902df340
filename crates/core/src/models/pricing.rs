use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;

/// Polish VAT applied to the domestic net price. Fixed; never taken from user input.
pub const DOMESTIC_VAT_RATE: f64 = 0.23;

/// Marketplace commission applied when the user has not overridden it.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.15;

/// VAT of the buyer's jurisdiction when the user has not overridden it.
pub const DEFAULT_CLIENT_VAT_RATE: f64 = 0.23;

/// The field the user touched last. Decides which amount is authoritative
/// on the next recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditedField {
    Net,
    Gross,
    ListingPrice,
    ClientVat,
}

impl std::fmt::Display for EditedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditedField::Net => write!(f, "Net"),
            EditedField::Gross => write!(f, "Gross"),
            EditedField::ListingPrice => write!(f, "Listing price"),
            EditedField::ClientVat => write!(f, "Client VAT"),
        }
    }
}

/// All values shown by the calculator for one session.
///
/// Amounts are `None` while blank. They are kept at full precision;
/// rounding to 2 decimals only happens when formatting for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInputs {
    /// Domestic price without VAT (PLN)
    pub net_amount: Option<f64>,

    /// Domestic price with the fixed 23% VAT (PLN), always `net * 1.23`
    pub gross_amount: Option<f64>,

    /// Price shown to the foreign buyer, in `currency`
    pub listing_price: Option<f64>,

    pub currency: CurrencyCode,

    /// Foreign currency units per 1 PLN
    pub exchange_rate: f64,

    /// Fraction, e.g. 0.15 for 15%
    pub commission_rate: f64,

    /// Fraction in `[0, 1]`
    pub client_vat_rate: f64,

    pub last_edited_field: Option<EditedField>,
}

impl PricingInputs {
    /// Blank amounts with the given currency and rates.
    pub fn new(
        currency: CurrencyCode,
        exchange_rate: f64,
        commission_rate: f64,
        client_vat_rate: f64,
    ) -> Self {
        Self {
            net_amount: None,
            gross_amount: None,
            listing_price: None,
            currency,
            exchange_rate,
            commission_rate,
            client_vat_rate,
            last_edited_field: None,
        }
    }

    /// Net amount if it holds a usable (finite) number.
    pub fn known_net(&self) -> Option<f64> {
        self.net_amount.filter(|v| v.is_finite())
    }

    /// Gross amount if it holds a usable (finite) number.
    pub fn known_gross(&self) -> Option<f64> {
        self.gross_amount.filter(|v| v.is_finite())
    }

    /// Listing price if it holds a usable (finite) number.
    pub fn known_listing_price(&self) -> Option<f64> {
        self.listing_price.filter(|v| v.is_finite())
    }

    /// True when at least one of net, gross or listing price is filled in.
    pub fn has_amount(&self) -> bool {
        self.known_net().is_some()
            || self.known_gross().is_some()
            || self.known_listing_price().is_some()
    }
}

impl Default for PricingInputs {
    fn default() -> Self {
        let currency = CurrencyCode::default();
        Self::new(
            currency,
            currency.default_rate(),
            DEFAULT_COMMISSION_RATE,
            DEFAULT_CLIENT_VAT_RATE,
        )
    }
}

/// Listing price as it stood after the last user-driven recompute.
///
/// Switching currencies converts from this snapshot rather than from the
/// currently displayed price, so switching back lands on the exact original.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalListing {
    pub price: f64,
    pub rate: f64,
    pub currency: CurrencyCode,
}

/// Explicit calculator state: the displayed values plus the snapshot used
/// for currency switching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSession {
    pub inputs: PricingInputs,

    #[serde(default)]
    pub original_listing: Option<OriginalListing>,
}

impl PricingSession {
    pub fn new(inputs: PricingInputs) -> Self {
        Self {
            inputs,
            original_listing: None,
        }
    }

    /// Snapshot the current listing price as the new switching baseline.
    pub(crate) fn remember_listing(&mut self) {
        self.original_listing = self.inputs.known_listing_price().map(|price| OriginalListing {
            price,
            rate: self.inputs.exchange_rate,
            currency: self.inputs.currency,
        });
    }
}
