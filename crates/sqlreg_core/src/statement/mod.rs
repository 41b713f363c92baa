//! Statement registry contracts and backends.
//!
//! # Responsibility
//! - Define the capability set shared by every registry backend:
//!   [`StatementStore`] (register/find) and [`UpdatableStore`]
//!   (update_one/update_batch).
//! - Provide the transient, concurrent and SQLite-backed implementations.
//! - Load the initial statement set and expose fail-fast lookup.
//!
//! # Invariants
//! - `register` overwrites an existing key; it never duplicates entries.
//! - `find` never returns a default value for a missing key.
//! - `update_batch` mutates every key in the batch or none of them.

use crate::db::DbError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod concurrent;
pub mod loader;
pub mod memory;
pub mod service;
pub mod sqlite;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-level registry error.
#[derive(Debug)]
pub enum StoreError {
    /// Single-key lookup or update missed.
    NotFound(String),
    /// A batch referenced a missing key; no entry of the batch was applied.
    BatchUpdateFailed { key: String },
    /// Persistent backend failure.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "statement not found: `{key}`"),
            Self::BatchUpdateFailed { key } => write!(
                f,
                "batch update rejected: statement `{key}` does not exist; no entries were changed"
            ),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::BatchUpdateFailed { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key -> statement text registry.
///
/// In-memory backends never fail on `register`; the SQLite backend can only
/// fail with [`StoreError::Db`].
pub trait StatementStore {
    /// Inserts `text` under `key`, replacing any previous text.
    fn register(&self, key: &str, text: &str) -> StoreResult<()>;
    /// Returns the current text for `key`.
    fn find(&self, key: &str) -> StoreResult<String>;
}

/// Registry that also supports in-place updates of existing keys.
pub trait UpdatableStore: StatementStore {
    /// Replaces the text of an existing key. Never inserts.
    fn update_one(&self, key: &str, text: &str) -> StoreResult<()>;
    /// Replaces the text of every key in `entries` as one unit.
    ///
    /// # Errors
    /// - [`StoreError::BatchUpdateFailed`] naming the first missing key in
    ///   iteration order; the store is left exactly as before the call.
    fn update_batch(&self, entries: &BTreeMap<String, String>) -> StoreResult<()>;
}

impl<S: StatementStore + ?Sized> StatementStore for &S {
    fn register(&self, key: &str, text: &str) -> StoreResult<()> {
        (**self).register(key, text)
    }

    fn find(&self, key: &str) -> StoreResult<String> {
        (**self).find(key)
    }
}

impl<S: UpdatableStore + ?Sized> UpdatableStore for &S {
    fn update_one(&self, key: &str, text: &str) -> StoreResult<()> {
        (**self).update_one(key, text)
    }

    fn update_batch(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        (**self).update_batch(entries)
    }
}

impl<S: StatementStore + ?Sized> StatementStore for Arc<S> {
    fn register(&self, key: &str, text: &str) -> StoreResult<()> {
        (**self).register(key, text)
    }

    fn find(&self, key: &str) -> StoreResult<String> {
        (**self).find(key)
    }
}

impl<S: UpdatableStore + ?Sized> UpdatableStore for Arc<S> {
    fn update_one(&self, key: &str, text: &str) -> StoreResult<()> {
        (**self).update_one(key, text)
    }

    fn update_batch(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        (**self).update_batch(entries)
    }
}

/// Returns the first key of `entries` that `exists` rejects.
///
/// Shared by the map-backed stores, which validate a batch before applying it.
pub(crate) fn first_missing_key<'a>(
    entries: &'a BTreeMap<String, String>,
    exists: impl Fn(&str) -> bool,
) -> Option<&'a String> {
    entries.keys().find(|key| !exists(key.as_str()))
}
