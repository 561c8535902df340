//! Display strings with the calculator's fixed precisions:
//! money 2 decimals, exchange rates 4, the multiplier 6.

use serde::{Deserialize, Serialize};

use crate::models::pricing::PricingInputs;
use crate::services::conversion_service::multiplier;

/// Shown for blank or non-numeric values.
pub const PLACEHOLDER: &str = "-";

pub fn format_money(value: f64) -> String {
    fixed(value, 2)
}

pub fn format_rate(value: f64) -> String {
    fixed(value, 4)
}

pub fn format_multiplier(value: f64) -> String {
    fixed(value, 6)
}

/// A fraction as a percentage with one decimal: 0.23 → "23.0".
pub fn format_percent(fraction: f64) -> String {
    fixed(fraction * 100.0, 1)
}

pub fn format_optional_money(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format_money)
}

fn fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let s = format!("{value:.decimals$}");
    // "-0.00" reads as a negative price
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Every calculator field rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDisplay {
    pub net: String,
    pub gross: String,
    pub listing_price: String,
    pub currency: String,
    pub exchange_rate: String,
    pub commission: String,
    pub client_vat: String,
    pub multiplier: String,
    /// e.g. "EUR (incl. VAT 23%)"
    pub listing_label: String,
    /// e.g. "1 PLN = 0.2326 EUR"
    pub rate_label: String,
}

impl PricingDisplay {
    pub fn from_inputs(inputs: &PricingInputs) -> Self {
        let exchange_rate = format_rate(inputs.exchange_rate);
        let vat_percent = inputs.client_vat_rate * 100.0;
        let vat_label = if vat_percent.is_finite() {
            // 23 → "23", 7.5 → "7.5"
            let rounded = (vat_percent * 100.0).round() / 100.0;
            format!("{rounded}")
        } else {
            "0".to_string()
        };

        Self {
            net: format_optional_money(inputs.known_net()),
            gross: format_optional_money(inputs.known_gross()),
            listing_price: format_optional_money(inputs.known_listing_price()),
            currency: inputs.currency.code().to_string(),
            commission: format_percent(inputs.commission_rate),
            client_vat: format_percent(inputs.client_vat_rate),
            multiplier: format_multiplier(multiplier(
                inputs.exchange_rate,
                inputs.commission_rate,
                inputs.client_vat_rate,
            )),
            listing_label: format!("{} (incl. VAT {vat_label}%)", inputs.currency),
            rate_label: format!("1 PLN = {exchange_rate} {}", inputs.currency),
            exchange_rate,
        }
    }
}
