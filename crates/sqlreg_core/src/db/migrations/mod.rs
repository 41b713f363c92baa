//! Schema steps for the `sqlmap` and `members` tables.
//!
//! # Invariants
//! - Step versions start at 1 and grow by one per entry.
//! - After a successful upgrade `PRAGMA user_version` equals the last step
//!   applied; a failed upgrade leaves the previous version in place.

use crate::db::{schema_version, DbError, DbResult, TxScope};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "0001_sqlmap",
        sql: include_str!("0001_sqlmap.sql"),
    },
    SchemaStep {
        version: 2,
        name: "0002_members",
        sql: include_str!("0002_members.sql"),
    },
];

/// Highest schema version this build can open.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to [`latest_version`] inside one transaction.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file was written by a
///   newer build. Nothing is changed in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let target = latest_version();

    match from.cmp(&target) {
        std::cmp::Ordering::Greater => Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: target,
        }),
        std::cmp::Ordering::Equal => Ok(()),
        std::cmp::Ordering::Less => TxScope::run(conn, "schema_upgrade", |tx| {
            for step in STEPS.iter().skip_while(|step| step.version <= from) {
                tx.execute_batch(step.sql)?;
                tx.pragma_update(None, "user_version", step.version)?;
                info!(
                    "event=db_migrate module=db status=ok step={} version={}",
                    step.name, step.version
                );
            }
            Ok(())
        }),
    }
}
