//! Ordered schema steps, tracked through `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` pairs, strictly increasing by version.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_periods.sql"))];

/// Schema version a freshly migrated database reports.
pub const SCHEMA_VERSION: u32 = STEPS[STEPS.len() - 1].0;

/// Runs every step newer than the stored version in one transaction.
///
/// Returns the number of steps applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let pending: Vec<_> = STEPS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={found} to={SCHEMA_VERSION} steps={}",
        pending.len()
    );
    Ok(pending.len())
}
