//! Embedded schema migrations for the card store.
//!
//! # Responsibility
//! - Bring any connection up to the schema this binary understands.
//! - Refuse databases written by a newer binary.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - `PRAGMA user_version` always equals the last step applied.
//! - The pending set is decided under the write lock, so concurrent openers
//!   of one unmigrated file never run the same step twice.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// One forward-only schema step.
struct Step {
    version: u32,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Applies pending steps on `conn` and returns how many ran.
///
/// A connection already at the latest version only pays one `PRAGMA` read.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let latest = latest_version();
    if ensure_supported(current_user_version(conn)?, latest)? == latest {
        return Ok(0);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    // Another connection may have migrated while this one waited for the lock.
    let locked_version = ensure_supported(current_user_version(&tx)?, latest)?;

    let pending: Vec<&Step> = STEPS
        .iter()
        .filter(|step| step.version > locked_version)
        .collect();
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    Ok(pending.len())
}

fn ensure_supported(version: u32, latest: u32) -> DbResult<u32> {
    if version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: latest,
        });
    }
    Ok(version)
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
