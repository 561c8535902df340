use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::conversion_service::{
    listing_from_net, multiplier, validate_client_vat_rate, validate_commission_rate,
};
use crate::errors::CoreError;
use crate::models::currency::CurrencyCode;

/// One currency's result in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub currency: CurrencyCode,
    pub rate: f64,
    pub listing_price: f64,
    pub multiplier: f64,
}

/// The same net amount priced in several currencies, cheapest listing first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyComparison {
    pub net: f64,
    pub rows: Vec<ComparisonRow>,
}

impl CurrencyComparison {
    /// Row with the lowest listing price.
    pub fn best(&self) -> Option<&ComparisonRow> {
        self.rows.first()
    }

    /// Highest minus lowest listing price (0 with fewer than two rows).
    /// Mixes currencies, so it is only a rough indicator.
    pub fn spread(&self) -> f64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => last.listing_price - first.listing_price,
            _ => 0.0,
        }
    }
}

pub struct ComparisonService;

impl ComparisonService {
    pub fn new() -> Self {
        Self
    }

    /// Price `net` PLN in every currency that has a usable rate in `rates`.
    /// Currencies with a missing, zero or non-finite rate are skipped.
    pub fn compare(
        &self,
        net: f64,
        rates: &HashMap<CurrencyCode, f64>,
        commission_rate: f64,
        client_vat_rate: f64,
    ) -> Result<CurrencyComparison, CoreError> {
        if !net.is_finite() || net <= 0.0 {
            return Err(CoreError::ValidationError(
                "Enter a valid net amount greater than zero".into(),
            ));
        }
        validate_commission_rate(commission_rate)?;
        validate_client_vat_rate(client_vat_rate)?;

        let mut rows: Vec<ComparisonRow> = rates
            .iter()
            .filter(|(_, rate)| rate.is_finite() && **rate > 0.0)
            .map(|(&currency, &rate)| ComparisonRow {
                currency,
                rate,
                listing_price: listing_from_net(net, rate, commission_rate, client_vat_rate),
                multiplier: multiplier(rate, commission_rate, client_vat_rate),
            })
            .collect();

        // HashMap order is arbitrary; the currency tiebreak keeps output deterministic.
        rows.sort_by(|a, b| {
            a.listing_price
                .total_cmp(&b.listing_price)
                .then_with(|| a.currency.cmp(&b.currency))
        });

        Ok(CurrencyComparison { net, rows })
    }
}

impl Default for ComparisonService {
    fn default() -> Self {
        Self::new()
    }
}
