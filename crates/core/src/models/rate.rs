use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::currency::CurrencyCode;

/// Selectable exchange-rate provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    #[default]
    Frankfurter,
    #[serde(rename = "exchangerate")]
    ExchangeRateHost,
    #[serde(rename = "erapi")]
    OpenErApi,
}

impl RateSource {
    pub const ALL: [RateSource; 3] = [
        RateSource::Frankfurter,
        RateSource::ExchangeRateHost,
        RateSource::OpenErApi,
    ];

    /// Human-readable label, as shown next to a fetched rate.
    pub fn label(&self) -> &'static str {
        match self {
            RateSource::Frankfurter => "Frankfurter",
            RateSource::ExchangeRateHost => "exchangerate.host",
            RateSource::OpenErApi => "open.er-api.com",
        }
    }
}

impl std::fmt::Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a quoted rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateOrigin {
    Provider(RateSource),
    Cache,
    /// Hard-coded table; every provider failed.
    Default,
}

/// A PLN → `currency` rate ready for the conversion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub currency: CurrencyCode,
    /// Foreign currency units per 1 PLN
    pub rate: f64,
    pub origin: RateOrigin,
    pub fetched_at: DateTime<Utc>,
}

impl RateQuote {
    pub fn is_fallback(&self) -> bool {
        self.origin == RateOrigin::Default
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedRate {
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Short-lived in-memory cache of fetched rates, keyed by currency.
/// Default-table rates are never cached so the next call retries the network.
#[derive(Debug, Clone, Default)]
pub struct RateCache {
    entries: HashMap<CurrencyCode, CachedRate>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rate for `currency` if it was fetched less than `ttl` before `now`.
    pub fn get_fresh(
        &self,
        currency: CurrencyCode,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<CachedRate> {
        self.entries
            .get(&currency)
            .filter(|c| now - c.fetched_at < ttl)
            .copied()
    }

    pub fn set(&mut self, currency: CurrencyCode, rate: f64, fetched_at: DateTime<Utc>) {
        self.entries.insert(currency, CachedRate { rate, fetched_at });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
