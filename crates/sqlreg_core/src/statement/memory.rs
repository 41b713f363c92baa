//! Transient, single-threaded registry backend.

use super::{first_missing_key, StatementStore, StoreError, StoreResult, UpdatableStore};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// Plain map registry.
///
/// Interior `RefCell` keeps the type `!Sync`, so sharing one instance across
/// threads does not compile. Use [`super::concurrent::ConcurrentStore`] for
/// that.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StatementStore for InMemoryStore {
    fn register(&self, key: &str, text: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn find(&self, key: &str) -> StoreResult<String> {
        self.entries
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

impl UpdatableStore for InMemoryStore {
    fn update_one(&self, key: &str, text: &str) -> StoreResult<()> {
        match self.entries.borrow_mut().get_mut(key) {
            Some(current) => {
                *current = text.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    fn update_batch(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let mut current = self.entries.borrow_mut();
        if let Some(key) = first_missing_key(entries, |key| current.contains_key(key)) {
            return Err(StoreError::BatchUpdateFailed { key: key.clone() });
        }
        for (key, text) in entries {
            current.insert(key.clone(), text.clone());
        }
        Ok(())
    }
}
