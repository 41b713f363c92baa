//! Explicit transaction scope for multi-write units of work.
//!
//! # Responsibility
//! - Open one `IMMEDIATE` SQLite transaction per unit of work.
//! - Release it exactly once: commit on success, rollback on error.
//!
//! # Invariants
//! - A scope that is dropped without `commit` rolls back.
//! - Writes issued through [`TxScope::connection`] are invisible to other
//!   connections until commit.

use super::{DbError, DbResult};
use log::{debug, error};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// One open transaction bound to a mutable connection borrow.
pub struct TxScope<'conn> {
    tx: Transaction<'conn>,
    label: &'static str,
}

impl<'conn> TxScope<'conn> {
    /// Opens a write transaction. `label` only tags log events.
    pub fn begin(conn: &'conn mut Connection, label: &'static str) -> DbResult<Self> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("event=tx_scope module=db status=start label={label}");
        Ok(Self { tx, label })
    }

    /// Connection view whose writes belong to this scope.
    pub fn connection(&self) -> &Connection {
        &self.tx
    }

    pub fn commit(self) -> DbResult<()> {
        let label = self.label;
        self.tx.commit()?;
        debug!("event=tx_scope module=db status=commit label={label}");
        Ok(())
    }

    pub fn rollback(self) -> DbResult<()> {
        let label = self.label;
        self.tx.rollback()?;
        debug!("event=tx_scope module=db status=rollback label={label}");
        Ok(())
    }

    /// Runs `work` inside a fresh scope.
    ///
    /// Commits when `work` returns `Ok`; otherwise rolls back and returns the
    /// original error. A failed rollback is logged, and the transaction is still
    /// discarded when the scope drops.
    pub fn run<T, E>(
        conn: &'conn mut Connection,
        label: &'static str,
        work: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let scope = Self::begin(conn, label)?;
        match work(scope.connection()) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = scope.rollback() {
                    error!(
                        "event=tx_scope module=db status=error label={label} error_code=rollback_failed error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }
}
