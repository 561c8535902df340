use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::currency::CurrencyCode;
use crate::models::mapping::PnMappingTable;
use crate::models::rate::RateSource;

/// Source of PLN-based exchange rates.
///
/// Every implementation answers "how many units of `currency` for 1 PLN".
/// Swapping or adding a provider touches only its own implementation.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which selectable source this provider implements.
    fn source(&self) -> RateSource;

    /// Latest PLN → `currency` rate.
    async fn fetch_rate(&self, currency: CurrencyCode) -> Result<f64, CoreError>;

    /// Latest rates for several currencies in one request.
    /// Currencies the provider has no rate for are absent from the result.
    async fn fetch_rates(
        &self,
        currencies: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, f64>, CoreError>;
}

/// Remote copy of the part-number mapping table.
///
/// The local cache stays authoritative; this is only read on explicit refresh
/// and written best-effort after edits.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MappingStore: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<PnMappingTable, CoreError>;

    /// Replace the remote table with `table`.
    async fn push(&self, table: &PnMappingTable) -> Result<(), CoreError>;
}
