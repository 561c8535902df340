use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;

use super::http;
use super::traits::RateProvider;
use crate::errors::CoreError;
use crate::models::currency::CurrencyCode;
use crate::models::rate::RateSource;

const BASE_URL: &str = "https://api.frankfurter.app";

/// Frankfurter API provider for PLN exchange rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) data.
/// - **Endpoint**: `/latest?from=PLN&to=EUR,USD`
///
/// Also the fallback whenever another selected provider fails.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at another deployment (self-hosted Frankfurter, test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http::default_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn latest_url(&self, currencies: &[CurrencyCode]) -> String {
        format!(
            "{}/latest?from=PLN&to={}",
            self.base_url,
            http::join_codes(currencies)
        )
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    fn source(&self) -> RateSource {
        RateSource::Frankfurter
    }

    async fn fetch_rate(&self, currency: CurrencyCode) -> Result<f64, CoreError> {
        let rates = http::get_rates(&self.client, self.name(), &self.latest_url(&[currency])).await?;
        http::pick_rate(&rates, self.name(), currency)
    }

    async fn fetch_rates(
        &self,
        currencies: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, f64>, CoreError> {
        if currencies.is_empty() {
            return Ok(HashMap::new());
        }
        let rates = http::get_rates(&self.client, self.name(), &self.latest_url(currencies)).await?;
        Ok(http::pick_rates(&rates, currencies))
    }
}
