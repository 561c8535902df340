use tracing::{info, warn};

use super::part_number_service::{PartNumberResolver, VendorMatch};
use crate::errors::CoreError;
use crate::models::mapping::{normalize_code, PnMappingTable};
use crate::providers::traits::MappingStore;
use crate::storage::manager::StorageManager;
use crate::storage::store::KeyValueStore;

/// What happened to the remote copy after a local change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote store accepted the full table.
    Synced,
    /// Saved locally only (no remote configured, or the push failed).
    LocalOnly,
}

/// Owns the part-number mapping table: lookups, edits, cache write-back and
/// best-effort sync with a remote store.
///
/// The local copy is authoritative. Remote failures are logged and never
/// undo or block a local edit.
pub struct MappingService {
    table: PnMappingTable,
    resolver: PartNumberResolver,
}

impl MappingService {
    pub fn new(table: PnMappingTable) -> Self {
        Self {
            table,
            resolver: PartNumberResolver::new(),
        }
    }

    /// Table from the local cache (built-in table if absent or corrupt).
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self::new(StorageManager::load_mapping_table(store))
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        StorageManager::save_mapping_table(store, &self.table)
    }

    pub fn table(&self) -> &PnMappingTable {
        &self.table
    }

    pub fn resolve(&self, raw_code: &str) -> VendorMatch {
        self.resolver.resolve(raw_code, &self.table)
    }

    // ── Edits ───────────────────────────────────────────────────────

    pub async fn upsert_exact(
        &mut self,
        code: &str,
        vendor: &str,
        store: &mut dyn KeyValueStore,
        remote: Option<&dyn MappingStore>,
    ) -> Result<SyncOutcome, CoreError> {
        if !self.table.insert_exact(code, vendor) {
            return Err(CoreError::InvalidMapping(format!(
                "Part number and vendor must not be empty (got '{code}' → '{vendor}')"
            )));
        }
        self.persist(store, remote).await
    }

    pub async fn remove_exact(
        &mut self,
        code: &str,
        store: &mut dyn KeyValueStore,
        remote: Option<&dyn MappingStore>,
    ) -> Result<SyncOutcome, CoreError> {
        if self.table.remove_exact(code).is_none() {
            return Err(CoreError::InvalidMapping(format!(
                "No exact mapping for '{}'",
                normalize_code(code)
            )));
        }
        self.persist(store, remote).await
    }

    pub async fn add_pattern(
        &mut self,
        pattern: &str,
        vendor: &str,
        store: &mut dyn KeyValueStore,
        remote: Option<&dyn MappingStore>,
    ) -> Result<SyncOutcome, CoreError> {
        if normalize_code(pattern).is_empty() || vendor.trim().is_empty() {
            return Err(CoreError::InvalidMapping(format!(
                "Pattern and vendor must not be empty (got '{pattern}' → '{vendor}')"
            )));
        }
        if !self.table.insert_pattern(pattern, vendor) {
            return Err(CoreError::InvalidMapping(format!(
                "Pattern '{}' → '{}' already exists",
                normalize_code(pattern),
                vendor.trim()
            )));
        }
        self.persist(store, remote).await
    }

    pub async fn remove_pattern(
        &mut self,
        pattern: &str,
        store: &mut dyn KeyValueStore,
        remote: Option<&dyn MappingStore>,
    ) -> Result<SyncOutcome, CoreError> {
        if self.table.remove_pattern(pattern) == 0 {
            return Err(CoreError::InvalidMapping(format!(
                "No pattern '{}'",
                normalize_code(pattern)
            )));
        }
        self.persist(store, remote).await
    }

    /// Replace the whole table (e.g. an imported file).
    pub async fn replace_table(
        &mut self,
        table: PnMappingTable,
        store: &mut dyn KeyValueStore,
        remote: Option<&dyn MappingStore>,
    ) -> Result<SyncOutcome, CoreError> {
        self.table = table;
        self.persist(store, remote).await
    }

    // ── Remote ──────────────────────────────────────────────────────

    /// Pull the remote table and make it the local one.
    /// On failure the current table stays untouched and the error is returned.
    pub async fn refresh(
        &mut self,
        remote: &dyn MappingStore,
        store: &mut dyn KeyValueStore,
    ) -> Result<(), CoreError> {
        let table = remote.fetch().await.inspect_err(|e| {
            warn!(store = remote.name(), error = %e, "mapping refresh failed, keeping cached table");
        })?;
        info!(store = remote.name(), entries = table.len(), "refreshed mapping table");
        self.table = table;
        self.save(store)
    }

    /// Push the current table. Failures are logged, not returned.
    pub async fn sync(&self, remote: &dyn MappingStore) -> SyncOutcome {
        match remote.push(&self.table).await {
            Ok(()) => {
                info!(store = remote.name(), entries = self.table.len(), "pushed mapping table");
                SyncOutcome::Synced
            }
            Err(e) => {
                warn!(store = remote.name(), error = %e, "mapping push failed, kept locally");
                SyncOutcome::LocalOnly
            }
        }
    }

    async fn persist(
        &self,
        store: &mut dyn KeyValueStore,
        remote: Option<&dyn MappingStore>,
    ) -> Result<SyncOutcome, CoreError> {
        self.save(store)?;
        match remote {
            Some(remote) => Ok(self.sync(remote).await),
            None => Ok(SyncOutcome::LocalOnly),
        }
    }
}
