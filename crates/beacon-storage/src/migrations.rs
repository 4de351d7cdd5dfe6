//! Idempotent schema setup, run on every open.

use rusqlite::Connection;

use beacon_core::errors::{BeaconResult, StorageError};

pub fn run_migrations(conn: &Connection) -> BeaconResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tracking_commands (
            command_id             TEXT PRIMARY KEY,
            process_id             TEXT NOT NULL,
            data                   TEXT NOT NULL,
            is_ready_on_background INTEGER NOT NULL,
            created_at             REAL NOT NULL,
            updated_at             REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tracking_commands_owner
            ON tracking_commands (process_id, created_at);",
    )
    .map_err(|e| {
        StorageError::MigrationFailed {
            reason: e.to_string(),
        }
        .into()
    })
}
