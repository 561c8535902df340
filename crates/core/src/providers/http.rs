use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::config::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::models::currency::CurrencyCode;

/// `{ "rates": { "EUR": 0.23, ... } }`, shared by all supported rate APIs.
#[derive(Deserialize)]
pub(crate) struct RatesResponse {
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

/// HTTP client with the configured timeout (timeouts are not available on wasm).
pub(crate) fn build_client(timeout_secs: u64) -> Client {
    let builder = Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(Duration::from_secs(timeout_secs));
    #[cfg(target_arch = "wasm32")]
    let _ = timeout_secs;
    builder.build().unwrap_or_else(|_| Client::new())
}

pub(crate) fn default_client() -> Client {
    build_client(DEFAULT_HTTP_TIMEOUT_SECS)
}

/// GET `url` and decode a rates payload.
pub(crate) async fn get_rates(
    client: &Client,
    provider: &str,
    url: &str,
) -> Result<HashMap<String, f64>, CoreError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(CoreError::Api {
            provider: provider.into(),
            message: format!("HTTP {}", resp.status()),
        });
    }
    let body: RatesResponse = resp.json().await.map_err(|e| CoreError::Api {
        provider: provider.into(),
        message: format!("Failed to parse rates response: {e}"),
    })?;
    Ok(body.rates)
}

/// A usable rate: present, finite and positive.
pub(crate) fn pick_rate(
    rates: &HashMap<String, f64>,
    provider: &str,
    currency: CurrencyCode,
) -> Result<f64, CoreError> {
    match rates.get(currency.code()).copied() {
        Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        _ => Err(CoreError::Api {
            provider: provider.into(),
            message: format!("No rate found for PLN → {currency}"),
        }),
    }
}

/// All usable rates among `currencies`.
pub(crate) fn pick_rates(
    rates: &HashMap<String, f64>,
    currencies: &[CurrencyCode],
) -> HashMap<CurrencyCode, f64> {
    currencies
        .iter()
        .filter_map(|&c| {
            let rate = *rates.get(c.code())?;
            (rate.is_finite() && rate > 0.0).then_some((c, rate))
        })
        .collect()
}

/// Comma-joined ISO codes for query strings.
pub(crate) fn join_codes(currencies: &[CurrencyCode]) -> String {
    currencies
        .iter()
        .map(CurrencyCode::code)
        .collect::<Vec<_>>()
        .join(",")
}
