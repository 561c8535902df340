use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::store::KeyValueStore;
use crate::errors::CoreError;
use crate::models::history::CalculationHistory;
use crate::models::mapping::PnMappingTable;
use crate::models::settings::AppSettings;

pub const SETTINGS_KEY: &str = "ebay-calculator-settings";
pub const HISTORY_KEY: &str = "ebay-calculator-history";
pub const PN_MAPPINGS_KEY: &str = "pnMappings";

/// High-level load/save of everything the calculator persists.
///
/// Loading never fails: a missing entry yields the default, and an entry that
/// cannot be read or parsed is logged and replaced by the default as well.
pub struct StorageManager;

impl StorageManager {
    /// Cached settings merged over the defaults; out-of-range rates are reset.
    pub fn load_settings(store: &dyn KeyValueStore) -> AppSettings {
        Self::load_or(store, SETTINGS_KEY, AppSettings::default).validated()
    }

    pub fn save_settings(store: &mut dyn KeyValueStore, settings: &AppSettings) -> Result<(), CoreError> {
        Self::save(store, SETTINGS_KEY, settings)
    }

    pub fn reset_settings(store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        store.remove(SETTINGS_KEY)
    }

    /// Cached mapping table, or the built-in one when nothing usable is cached.
    pub fn load_mapping_table(store: &dyn KeyValueStore) -> PnMappingTable {
        Self::load_or(store, PN_MAPPINGS_KEY, PnMappingTable::builtin)
    }

    pub fn save_mapping_table(store: &mut dyn KeyValueStore, table: &PnMappingTable) -> Result<(), CoreError> {
        Self::save(store, PN_MAPPINGS_KEY, table)
    }

    pub fn load_history(store: &dyn KeyValueStore) -> CalculationHistory {
        Self::load_or(store, HISTORY_KEY, CalculationHistory::new)
    }

    pub fn save_history(store: &mut dyn KeyValueStore, history: &CalculationHistory) -> Result<(), CoreError> {
        Self::save(store, HISTORY_KEY, history)
    }

    pub fn clear_history(store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        store.remove(HISTORY_KEY)
    }

    fn load_or<T: DeserializeOwned>(
        store: &dyn KeyValueStore,
        key: &str,
        default: impl FnOnce() -> T,
    ) -> T {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default(),
            Err(e) => {
                warn!(key, error = %e, "failed to read cache entry, using defaults");
                return default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "corrupt cache entry, using defaults");
                default()
            }
        }
    }

    fn save<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), CoreError> {
        let json = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        store.set(key, &json)
    }
}
