//! Thread-safe registry backend.

use super::{first_missing_key, StatementStore, StoreError, StoreResult, UpdatableStore};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Registry safe to share across threads without caller-side locking.
///
/// Every operation runs under one `RwLock` acquisition, so each call is
/// linearizable and a batch is observed either fully applied or not at all.
/// Readers proceed in parallel; writers are exclusive.
#[derive(Debug, Default)]
pub struct ConcurrentStore {
    entries: RwLock<HashMap<String, String>>,
}

impl ConcurrentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of registered keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl StatementStore for ConcurrentStore {
    fn register(&self, key: &str, text: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn find(&self, key: &str) -> StoreResult<String> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

impl UpdatableStore for ConcurrentStore {
    fn update_one(&self, key: &str, text: &str) -> StoreResult<()> {
        match self.entries.write().get_mut(key) {
            Some(current) => {
                *current = text.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    fn update_batch(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let mut current = self.entries.write();
        if let Some(key) = first_missing_key(entries, |key| current.contains_key(key)) {
            return Err(StoreError::BatchUpdateFailed { key: key.clone() });
        }
        for (key, text) in entries {
            current.insert(key.clone(), text.clone());
        }
        Ok(())
    }
}
