//! Serialized access to the SQLite database. One connection behind a
//! mutex: every statement runs in its own serialized region, so writers
//! never interleave.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::Connection;

use beacon_core::errors::BeaconResult;

use crate::to_storage_err;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open a database file, creating it if needed.
    pub fn open(path: &Path) -> BeaconResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing and diskless hosts).
    pub fn open_in_memory() -> BeaconResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a closure against the connection inside the serialized region.
    pub fn with_conn<F, T>(&self, f: F) -> BeaconResult<T>
    where
        F: FnOnce(&Connection) -> BeaconResult<T>,
    {
        let conn: MutexGuard<'_, Connection> =
            self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&conn)
    }
}

fn apply_pragmas(conn: &Connection) -> BeaconResult<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| to_storage_err(format!("journal_mode: {e}")))?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| to_storage_err(format!("synchronous: {e}")))?;
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    Ok(())
}
