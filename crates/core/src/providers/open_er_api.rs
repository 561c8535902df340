use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;

use super::http;
use super::traits::RateProvider;
use crate::errors::CoreError;
use crate::models::currency::CurrencyCode;
use crate::models::rate::RateSource;

const BASE_URL: &str = "https://open.er-api.com";

/// open.er-api.com provider.
///
/// Has no symbol filter: `/v6/latest/PLN` returns every rate at once, so a
/// single request serves any number of currencies.
pub struct OpenErApiProvider {
    client: Client,
    base_url: String,
}

impl OpenErApiProvider {
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

    pub fn latest_url(&self) -> String {
        format!("{}/v6/latest/PLN", self.base_url)
    }
}

impl Default for OpenErApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for OpenErApiProvider {
    fn name(&self) -> &str {
        "open.er-api.com"
    }

    fn source(&self) -> RateSource {
        RateSource::OpenErApi
    }

    async fn fetch_rate(&self, currency: CurrencyCode) -> Result<f64, CoreError> {
        let rates = http::get_rates(&self.client, self.name(), &self.latest_url()).await?;
        http::pick_rate(&rates, self.name(), currency)
    }

    async fn fetch_rates(
        &self,
        currencies: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, f64>, CoreError> {
        let rates = http::get_rates(&self.client, self.name(), &self.latest_url()).await?;
        Ok(http::pick_rates(&rates, currencies))
    }
}
