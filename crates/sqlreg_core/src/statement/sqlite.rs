//! SQLite-backed updatable registry.
//!
//! # Responsibility
//! - Persist statements in the `sqlmap` table.
//! - Apply batch updates inside one transaction.
//!
//! # Invariants
//! - A batch update issues one `UPDATE` per entry and treats "0 rows
//!   affected" as a missing key, rolling back every earlier update of the
//!   batch. No existence pre-read is performed.
//! - All access goes through one connection mutex, so concurrent callers
//!   never interleave inside a batch.

use super::{StatementStore, StoreError, StoreResult, UpdatableStore};
use crate::db::{ensure_ready, open_db, open_db_in_memory, TxScope};
use log::{info, warn};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

const UPSERT_SQL: &str = "INSERT INTO sqlmap (key_, sql_) VALUES (?1, ?2)
     ON CONFLICT(key_) DO UPDATE SET sql_ = excluded.sql_;";
const SELECT_SQL: &str = "SELECT sql_ FROM sqlmap WHERE key_ = ?1;";
const UPDATE_SQL: &str = "UPDATE sqlmap SET sql_ = ?2 WHERE key_ = ?1;";

/// Durable registry over a migrated SQLite connection.
pub struct SqliteStatementStore {
    conn: Mutex<Connection>,
}

impl SqliteStatementStore {
    /// Wraps a connection that already carries the latest schema.
    ///
    /// # Errors
    /// - `StoreError::Db` when the connection is not migrated or has no
    ///   `sqlmap` table.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_ready(&conn, &["sqlmap"])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM sqlmap;", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl StatementStore for SqliteStatementStore {
    fn register(&self, key: &str, text: &str) -> StoreResult<()> {
        self.conn.lock().execute(UPSERT_SQL, params![key, text])?;
        Ok(())
    }

    fn find(&self, key: &str) -> StoreResult<String> {
        self.conn
            .lock()
            .query_row(SELECT_SQL, [key], |row| row.get::<_, String>(0))
            .optional()?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

impl UpdatableStore for SqliteStatementStore {
    fn update_one(&self, key: &str, text: &str) -> StoreResult<()> {
        let changed = self.conn.lock().execute(UPDATE_SQL, params![key, text])?;
        if changed == 0 {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }

    fn update_batch(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let started_at = Instant::now();
        let mut conn = self.conn.lock();

        let result = TxScope::run(&mut *conn, "statement_update_batch", |tx| {
            let mut stmt = tx.prepare_cached(UPDATE_SQL)?;
            for (key, text) in entries {
                if stmt.execute(params![key, text])? == 0 {
                    return Err(StoreError::BatchUpdateFailed { key: key.clone() });
                }
            }
            Ok(())
        });

        match &result {
            Ok(()) => info!(
                "event=statement_update_batch module=statement status=ok entries={} duration_ms={}",
                entries.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=statement_update_batch module=statement status=error entries={} duration_ms={} error={}",
                entries.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}
