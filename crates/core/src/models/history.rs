use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::CurrencyCode;
use super::pricing::EditedField;

/// One completed calculation, as kept in the history panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub net: f64,
    pub gross: f64,
    pub listing_price: f64,
    pub currency: CurrencyCode,
    pub exchange_rate: f64,
    pub commission_rate: f64,
    pub client_vat_rate: f64,
    pub multiplier: f64,

    /// Optional internal product id (1–6 digits)
    #[serde(default)]
    pub product_id: Option<String>,

    /// Field whose edit produced this calculation
    #[serde(default)]
    pub source: Option<EditedField>,

    /// Produced by a currency/VAT preset rather than a single edit
    #[serde(default)]
    pub preset: bool,
}

impl CalculationRecord {
    /// Everything that is visible in the history list, rounded the way it is shown.
    /// Two records with the same signature look identical to the user.
    pub fn signature(&self) -> String {
        format!(
            "{}|{:.2}|{:.2}|{:.2}|{}|{:.4}|{:.1}|{:.1}|{}",
            self.origin_label(),
            self.net,
            self.gross,
            self.listing_price,
            self.currency,
            self.exchange_rate,
            self.commission_rate * 100.0,
            self.client_vat_rate * 100.0,
            self.product_id.as_deref().unwrap_or(""),
        )
    }

    /// "Preset", the edited field, or empty when neither is known.
    pub fn origin_label(&self) -> String {
        if self.preset {
            "Preset".to_string()
        } else {
            self.source.map(|s| s.to_string()).unwrap_or_default()
        }
    }
}

/// Calculation history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationHistory {
    pub calculations: Vec<CalculationRecord>,
    pub last_updated: DateTime<Utc>,
}

impl CalculationHistory {
    pub fn new() -> Self {
        Self {
            calculations: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.calculations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculations.is_empty()
    }

    pub fn latest(&self) -> Option<&CalculationRecord> {
        self.calculations.first()
    }

    pub fn get(&self, id: Uuid) -> Option<&CalculationRecord> {
        self.calculations.iter().find(|c| c.id == id)
    }
}

impl Default for CalculationHistory {
    fn default() -> Self {
        Self::new()
    }
}
