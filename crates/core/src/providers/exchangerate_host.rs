use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;

use super::http;
use super::traits::RateProvider;
use crate::errors::CoreError;
use crate::models::currency::CurrencyCode;
use crate::models::rate::RateSource;

const BASE_URL: &str = "https://api.exchangerate.host";

/// exchangerate.host provider.
///
/// - **Endpoint**: `/latest?base=PLN&symbols=EUR,USD`
/// - Same `{rates: {...}}` payload as Frankfurter.
pub struct ExchangeRateHostProvider {
    client: Client,
    base_url: String,
}

impl ExchangeRateHostProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

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
            "{}/latest?base=PLN&symbols={}",
            self.base_url,
            http::join_codes(currencies)
        )
    }
}

impl Default for ExchangeRateHostProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for ExchangeRateHostProvider {
    fn name(&self) -> &str {
        "exchangerate.host"
    }

    fn source(&self) -> RateSource {
        RateSource::ExchangeRateHost
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
