pub mod errors;
pub mod format;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::HashMap;

use format::PricingDisplay;
use models::{
    config::CoreConfig,
    currency::CurrencyCode,
    history::{CalculationHistory, CalculationRecord},
    mapping::PnMappingTable,
    pricing::{EditedField, PricingInputs, PricingSession},
    rate::{RateCache, RateQuote},
    settings::{AppSettings, SettingsUpdate},
};
use providers::{mapping_store::HttpMappingStore, registry::RateProviderRegistry, traits::MappingStore};
use services::{
    comparison_service::{ComparisonService, CurrencyComparison},
    conversion_service::{multiplier, ConversionService},
    history_service::{validate_product_id, HistoryService},
    mapping_service::{MappingService, SyncOutcome},
    part_number_service::VendorMatch,
    rate_service::{ProviderStatus, RateService},
};
use storage::{manager::StorageManager, store::KeyValueStore};
use tracing::{debug, info};
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the pricing core.
/// Holds the calculator session, user settings, history and mapping table,
/// plus the services that operate on them.
#[must_use]
pub struct PricingCalculator {
    session: PricingSession,
    settings: AppSettings,
    config: CoreConfig,
    history: CalculationHistory,
    /// Records removed by the last `clear_history`, kept for undo.
    last_cleared: Vec<CalculationRecord>,
    rate_cache: RateCache,
    last_quote: Option<RateQuote>,
    conversion_service: ConversionService,
    rate_service: RateService,
    mapping_service: MappingService,
    history_service: HistoryService,
    comparison_service: ComparisonService,
    mapping_store: Option<Box<dyn MappingStore>>,
    /// Tracks whether settings or history changed since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for PricingCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingCalculator")
            .field("inputs", &self.session.inputs)
            .field("settings", &self.settings)
            .field("history", &self.history.len())
            .field("mappings", &self.mapping_service.table().len())
            .field("cached_rates", &self.rate_cache.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PricingCalculator {
    /// Fresh calculator with default settings, the built-in mapping table
    /// and an empty history.
    pub fn create_new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self::build(
            AppSettings::default(),
            PnMappingTable::builtin(),
            CalculationHistory::new(),
            config,
        )
    }

    /// Restore settings, mapping table and history from the local cache.
    /// Missing or corrupt entries fall back to their defaults.
    pub fn load_from_store(store: &dyn KeyValueStore, config: CoreConfig) -> Self {
        let settings = StorageManager::load_settings(store);
        let table = StorageManager::load_mapping_table(store);
        let history = StorageManager::load_history(store);
        info!(
            history = history.len(),
            mappings = table.len(),
            "loaded calculator state from cache"
        );
        Self::build(settings, table, history, config)
    }

    /// Write settings, mapping table and history to the local cache.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_store(&mut self, store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        StorageManager::save_settings(store, &self.settings)?;
        self.mapping_service.save(store)?;
        StorageManager::save_history(store, &self.history)?;
        self.dirty = false;
        Ok(())
    }

    /// Swap the rate providers (e.g. for offline use or tests).
    /// Keeps the configured cache TTL.
    pub fn with_rate_registry(mut self, registry: RateProviderRegistry) -> Self {
        self.rate_service = RateService::with_ttl(registry, self.config.rate_cache_ttl_secs);
        self
    }

    /// Use `store` as the remote mapping store instead of the configured URL.
    pub fn with_mapping_store(mut self, store: Box<dyn MappingStore>) -> Self {
        self.mapping_store = Some(store);
        self
    }

    // ── Price Editing ───────────────────────────────────────────────

    pub fn edit_net(&mut self, value: f64) -> Result<&PricingInputs, CoreError> {
        self.edit(EditedField::Net, value)
    }

    pub fn edit_gross(&mut self, value: f64) -> Result<&PricingInputs, CoreError> {
        self.edit(EditedField::Gross, value)
    }

    pub fn edit_listing_price(&mut self, value: f64) -> Result<&PricingInputs, CoreError> {
        self.edit(EditedField::ListingPrice, value)
    }

    /// `vat` is a fraction (0.23 for 23%). Values above 1 are clamped.
    pub fn edit_client_vat(&mut self, vat: f64) -> Result<&PricingInputs, CoreError> {
        self.edit(EditedField::ClientVat, vat)
    }

    /// Apply a user edit. On error the session is unchanged.
    /// With `auto_save` enabled, the finished calculation goes into the history.
    pub fn edit(&mut self, field: EditedField, value: f64) -> Result<&PricingInputs, CoreError> {
        self.session = self.conversion_service.apply_edit(&self.session, field, value)?;
        if self.settings.auto_save {
            self.auto_record(false);
        }
        Ok(&self.session.inputs)
    }

    pub fn set_commission_rate(&mut self, commission: f64) -> Result<&PricingInputs, CoreError> {
        self.session = self
            .conversion_service
            .set_commission_rate(&self.session, commission)?;
        Ok(&self.session.inputs)
    }

    /// Manual exchange-rate override (foreign currency per 1 PLN).
    pub fn set_exchange_rate(&mut self, rate: f64) -> Result<&PricingInputs, CoreError> {
        self.session = self.conversion_service.set_exchange_rate(&self.session, rate)?;
        Ok(&self.session.inputs)
    }

    /// Blank the calculator, back to the default currency and rates.
    /// A fresh cached rate for the default currency is reused.
    pub fn clear(&mut self) {
        let currency = self.settings.default_currency;
        let rate = self
            .rate_cache
            .get_fresh(currency, chrono::Utc::now(), self.rate_service.ttl())
            .map_or_else(|| currency.default_rate(), |cached| cached.rate);
        self.session = self.conversion_service.reset(&self.settings, rate);
        self.last_quote = None;
    }

    // ── Exchange Rates ──────────────────────────────────────────────

    /// Fetch the rate for `currency` and re-price the session in it.
    /// Rate lookup never fails (it degrades to the default table); the
    /// returned quote says where the rate came from.
    pub async fn switch_currency(&mut self, currency: CurrencyCode) -> Result<RateQuote, CoreError> {
        let quote = self
            .rate_service
            .get_rate(&mut self.rate_cache, currency, self.settings.rate_source)
            .await;
        self.session = self
            .conversion_service
            .switch_currency(&self.session, currency, quote.rate)?;
        debug!(%currency, rate = quote.rate, origin = ?quote.origin, "switched currency");
        self.last_quote = Some(quote.clone());
        Ok(quote)
    }

    /// Switch to `currency` and client VAT `vat` (a fraction) in one step.
    ///
    /// Prices are re-derived from the new VAT, not converted from the old
    /// listing. With `auto_save` enabled the result is recorded as a preset.
    pub async fn apply_preset(&mut self, currency: CurrencyCode, vat: f64) -> Result<RateQuote, CoreError> {
        let quote = self
            .rate_service
            .get_rate(&mut self.rate_cache, currency, self.settings.rate_source)
            .await;
        self.session = self
            .conversion_service
            .apply_preset(&self.session, currency, vat, quote.rate)?;
        info!(%currency, vat, rate = quote.rate, "applied preset");
        self.last_quote = Some(quote.clone());
        if self.settings.auto_save {
            self.auto_record(true);
        }
        Ok(quote)
    }

    /// Re-fetch the current currency's rate (bypassing the cache) and re-price.
    pub async fn refresh_rate(&mut self) -> Result<RateQuote, CoreError> {
        let currency = self.session.inputs.currency;
        self.rate_cache.clear();
        self.switch_currency(currency).await
    }

    /// Rates for every supported currency, batched through the selected provider.
    pub async fn fetch_all_rates(&mut self) -> HashMap<CurrencyCode, RateQuote> {
        self.rate_service
            .get_rates(&mut self.rate_cache, &CurrencyCode::ALL, self.settings.rate_source)
            .await
    }

    pub async fn check_providers(&self) -> Vec<ProviderStatus> {
        self.rate_service
            .check_providers(self.session.inputs.currency)
            .await
    }

    pub fn clear_rate_cache(&mut self) {
        self.rate_cache.clear();
    }

    /// Quote behind the current exchange rate, if it was fetched.
    #[must_use]
    pub fn last_quote(&self) -> Option<&RateQuote> {
        self.last_quote.as_ref()
    }

    // ── Session View ────────────────────────────────────────────────

    #[must_use]
    pub fn inputs(&self) -> &PricingInputs {
        &self.session.inputs
    }

    #[must_use]
    pub fn session(&self) -> &PricingSession {
        &self.session
    }

    #[must_use]
    pub fn display(&self) -> PricingDisplay {
        PricingDisplay::from_inputs(&self.session.inputs)
    }

    #[must_use]
    pub fn multiplier(&self) -> f64 {
        let inputs = &self.session.inputs;
        multiplier(inputs.exchange_rate, inputs.commission_rate, inputs.client_vat_rate)
    }

    // ── Comparison ──────────────────────────────────────────────────

    /// Price `net` PLN in every currency using cached or fetched rates,
    /// with the session's commission and client VAT.
    pub async fn compare_currencies(&mut self, net: f64) -> Result<CurrencyComparison, CoreError> {
        let rates: HashMap<CurrencyCode, f64> = self
            .fetch_all_rates()
            .await
            .into_iter()
            .map(|(currency, quote)| (currency, quote.rate))
            .collect();
        let inputs = &self.session.inputs;
        self.comparison_service
            .compare(net, &rates, inputs.commission_rate, inputs.client_vat_rate)
    }

    // ── History ─────────────────────────────────────────────────────

    /// Save the current calculation to the history.
    /// Returns the new record's id, or `None` if it repeats the latest entry.
    pub fn record_calculation(&mut self, product_id: Option<&str>) -> Result<Option<Uuid>, CoreError> {
        let product_id = match product_id.map(str::trim).filter(|p| !p.is_empty()) {
            Some(id) => {
                validate_product_id(id)?;
                Some(id.to_string())
            }
            None => None,
        };
        let mut record = self.current_record()?;
        record.product_id = product_id;
        let id = record.id;
        if !self.history_service.record(&mut self.history, record) {
            return Ok(None);
        }
        self.dirty = true;
        Ok(Some(id))
    }

    #[must_use]
    pub fn history(&self) -> &CalculationHistory {
        &self.history
    }

    pub fn delete_history_entry(&mut self, id: Uuid) -> Result<CalculationRecord, CoreError> {
        let removed = self.history_service.delete(&mut self.history, id)?;
        self.dirty = true;
        Ok(removed)
    }

    /// Empty the history. Returns how many records were removed;
    /// they can be brought back with `restore_history`.
    pub fn clear_history(&mut self) -> usize {
        self.last_cleared = self.history_service.clear(&mut self.history);
        if !self.last_cleared.is_empty() {
            self.dirty = true;
        }
        self.last_cleared.len()
    }

    /// Undo the last `clear_history`. Returns how many records were restored.
    pub fn restore_history(&mut self) -> usize {
        let cleared = std::mem::take(&mut self.last_cleared);
        let before = self.history.len();
        self.history_service.restore(&mut self.history, cleared);
        let restored = self.history.len().saturating_sub(before);
        if restored > 0 {
            self.dirty = true;
        }
        restored
    }

    // ── Part Numbers ────────────────────────────────────────────────

    #[must_use]
    pub fn resolve_part_number(&self, code: &str) -> VendorMatch {
        self.mapping_service.resolve(code)
    }

    #[must_use]
    pub fn mapping_table(&self) -> &PnMappingTable {
        self.mapping_service.table()
    }

    pub async fn upsert_mapping(
        &mut self,
        code: &str,
        vendor: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<SyncOutcome, CoreError> {
        self.mapping_service
            .upsert_exact(code, vendor, store, self.mapping_store.as_deref())
            .await
    }

    pub async fn remove_mapping(
        &mut self,
        code: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<SyncOutcome, CoreError> {
        self.mapping_service
            .remove_exact(code, store, self.mapping_store.as_deref())
            .await
    }

    pub async fn add_mapping_pattern(
        &mut self,
        pattern: &str,
        vendor: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<SyncOutcome, CoreError> {
        self.mapping_service
            .add_pattern(pattern, vendor, store, self.mapping_store.as_deref())
            .await
    }

    pub async fn remove_mapping_pattern(
        &mut self,
        pattern: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<SyncOutcome, CoreError> {
        self.mapping_service
            .remove_pattern(pattern, store, self.mapping_store.as_deref())
            .await
    }

    pub async fn replace_mappings(
        &mut self,
        table: PnMappingTable,
        store: &mut dyn KeyValueStore,
    ) -> Result<SyncOutcome, CoreError> {
        self.mapping_service
            .replace_table(table, store, self.mapping_store.as_deref())
            .await
    }

    /// Pull the table from the remote store. Without a remote this is a no-op.
    /// On failure the cached table stays in use and the error is returned.
    pub async fn refresh_mappings(&mut self, store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        match self.mapping_store.as_deref() {
            Some(remote) => self.mapping_service.refresh(remote, store).await,
            None => Ok(()),
        }
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Partially update settings. Nothing changes if a value is invalid.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<(), CoreError> {
        self.settings.apply(update)?;
        self.dirty = true;
        Ok(())
    }

    pub fn reset_settings(&mut self) {
        self.settings = AppSettings::default();
        self.dirty = true;
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Internals ───────────────────────────────────────────────────

    fn build(
        settings: AppSettings,
        table: PnMappingTable,
        history: CalculationHistory,
        config: CoreConfig,
    ) -> Self {
        let conversion_service = ConversionService::new();
        let session =
            conversion_service.reset(&settings, settings.default_currency.default_rate());
        let rate_service = RateService::with_ttl(
            RateProviderRegistry::new_with_defaults(config.http_timeout_secs),
            config.rate_cache_ttl_secs,
        );
        let mapping_store: Option<Box<dyn MappingStore>> =
            config.mapping_store_url.as_deref().map(|url| {
                Box::new(HttpMappingStore::new(url).with_timeout(config.http_timeout_secs))
                    as Box<dyn MappingStore>
            });

        Self {
            session,
            settings,
            history_service: HistoryService::with_limit(config.history_limit),
            config,
            history,
            last_cleared: Vec::new(),
            rate_cache: RateCache::new(),
            last_quote: None,
            conversion_service,
            rate_service,
            mapping_service: MappingService::new(table),
            comparison_service: ComparisonService::new(),
            mapping_store,
            dirty: false,
        }
    }

    /// Snapshot of the session as a history record. Needs all three amounts.
    fn current_record(&self) -> Result<CalculationRecord, CoreError> {
        let inputs = &self.session.inputs;
        let (Some(net), Some(gross), Some(listing_price)) = (
            inputs.known_net(),
            inputs.known_gross(),
            inputs.known_listing_price(),
        ) else {
            return Err(CoreError::InsufficientInput(
                "Nothing to save yet; enter an amount first".into(),
            ));
        };
        Ok(CalculationRecord {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            net,
            gross,
            listing_price,
            currency: inputs.currency,
            exchange_rate: inputs.exchange_rate,
            commission_rate: inputs.commission_rate,
            client_vat_rate: inputs.client_vat_rate,
            multiplier: self.multiplier(),
            product_id: None,
            source: inputs.last_edited_field,
            preset: false,
        })
    }

    fn auto_record(&mut self, preset: bool) {
        if let Ok(mut record) = self.current_record() {
            record.preset = preset;
            if self.history_service.record(&mut self.history, record) {
                self.dirty = true;
            }
        }
    }
}
