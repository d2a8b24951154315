//! SQLite backends for the submission and result stores.
//!
//! Each store owns its own database file and guards its connection with a
//! mutex; every call is a short blocking statement, so the lock is never held
//! across anything slow.

mod results;
mod submissions;

pub use results::SqliteResultStore;
pub use submissions::SqliteSubmissionStore;

use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rusqlite::Connection;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::dao::storage::{StorageError, StorageResult};

/// Open (or create) a database file and apply the given schema.
pub(crate) fn open_database(path: &Path, schema: &str) -> StorageResult<Connection> {
    let conn = Connection::open(path)
        .map_err(|err| StorageError::unavailable("opening database", err))?;
    conn.execute_batch(schema)
        .map_err(|err| StorageError::unavailable("applying schema", err))?;
    Ok(conn)
}

/// In-memory database with the given schema, for tests and tooling.
pub(crate) fn open_in_memory(schema: &str) -> StorageResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|err| StorageError::unavailable("opening database", err))?;
    conn.execute_batch(schema)
        .map_err(|err| StorageError::unavailable("applying schema", err))?;
    Ok(conn)
}

/// Acquire the connection lock, recovering from poisoning.
///
/// A poisoned lock only means another thread panicked mid-statement; the
/// connection itself is still usable for independent statements.
pub(crate) fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Current wall-clock time as an Rfc3339 string for `created_at` columns.
pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
