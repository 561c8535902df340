use chrono::Utc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::config::DEFAULT_HISTORY_LIMIT;
use crate::models::history::{CalculationHistory, CalculationRecord};

/// Longest accepted internal product id.
const MAX_PRODUCT_ID_DIGITS: usize = 6;

/// Keeps the calculation history bounded and free of repeated entries.
///
/// Pure business logic, no I/O. Persisting the history is the caller's job.
pub struct HistoryService {
    limit: usize,
}

impl HistoryService {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// A limit of 0 is treated as 1.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Prepend a record. Returns false when it looks exactly like the most
    /// recent entry and was therefore skipped.
    pub fn record(&self, history: &mut CalculationHistory, record: CalculationRecord) -> bool {
        if history
            .latest()
            .is_some_and(|last| last.signature() == record.signature())
        {
            return false;
        }
        history.calculations.insert(0, record);
        history.calculations.truncate(self.limit);
        history.last_updated = Utc::now();
        true
    }

    pub fn delete(&self, history: &mut CalculationHistory, id: Uuid) -> Result<CalculationRecord, CoreError> {
        let idx = history
            .calculations
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::RecordNotFound(id.to_string()))?;
        let removed = history.calculations.remove(idx);
        history.last_updated = Utc::now();
        Ok(removed)
    }

    /// Empty the history, handing back what was removed so it can be restored.
    pub fn clear(&self, history: &mut CalculationHistory) -> Vec<CalculationRecord> {
        history.last_updated = Utc::now();
        std::mem::take(&mut history.calculations)
    }

    /// Undo a [`HistoryService::clear`]. Records made since the clear stay on top,
    /// the restored ones follow them, then the limit is applied again.
    pub fn restore(&self, history: &mut CalculationHistory, cleared: Vec<CalculationRecord>) {
        if cleared.is_empty() {
            return;
        }
        for record in cleared {
            if history.get(record.id).is_none() {
                history.calculations.push(record);
            }
        }
        history.calculations.truncate(self.limit);
        history.last_updated = Utc::now();
    }
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal product ids are 1–6 ASCII digits.
pub fn validate_product_id(product_id: &str) -> Result<(), CoreError> {
    let id = product_id.trim();
    if id.is_empty() || id.len() > MAX_PRODUCT_ID_DIGITS || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::ValidationError(format!(
            "Product id must be 1-{MAX_PRODUCT_ID_DIGITS} digits, got '{id}'"
        )));
    }
    Ok(())
}
