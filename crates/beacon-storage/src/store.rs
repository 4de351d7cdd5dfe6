//! SqliteCommandStore — the CommandStore implementation. Best-effort: every
//! storage failure is logged and degraded, never surfaced to the producer.

use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::params;
use uuid::Uuid;

use beacon_core::config::defaults::DEFAULT_COMMAND_RETENTION_DAYS;
use beacon_core::errors::BeaconResult;
use beacon_core::{CommandStore, TrackingCommand};

use crate::connection::Database;
use crate::record::{unix_seconds, CommandRecord};
use crate::{migrations, to_storage_err};

/// Durable command storage scoped to one process instance.
///
/// Every handle gets a fresh process-instance id: rows written through this
/// handle are its own; rows carrying another id are survivors of a previous
/// run and show up in `retryable_commands`.
pub struct SqliteCommandStore {
    db: Database,
    process_id: String,
    retention: Duration,
}

impl SqliteCommandStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> BeaconResult<Self> {
        let db = Database::open(path)?;
        db.with_conn(migrations::run_migrations)?;
        Ok(Self {
            db,
            process_id: Uuid::new_v4().to_string(),
            retention: Duration::days(DEFAULT_COMMAND_RETENTION_DAYS),
        })
    }

    /// Open an in-memory store (for testing and diskless hosts).
    pub fn open_in_memory() -> BeaconResult<Self> {
        let db = Database::open_in_memory()?;
        db.with_conn(migrations::run_migrations)?;
        Ok(Self {
            db,
            process_id: Uuid::new_v4().to_string(),
            retention: Duration::days(DEFAULT_COMMAND_RETENTION_DAYS),
        })
    }

    /// Override the retention window.
    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.retention = Duration::days(days);
        self
    }

    /// Oldest `created_at` still inside the retention window. Rows older
    /// than this are ignored rather than deleted.
    fn cutoff(&self) -> f64 {
        unix_seconds(Utc::now() - self.retention)
    }

    fn fetch_commands<P: rusqlite::Params>(&self, sql: &str, params: P) -> Vec<TrackingCommand> {
        let result = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(params, CommandRecord::from_row)
                .map_err(|e| to_storage_err(e.to_string()))?;
            let mut commands = Vec::new();
            for row in rows {
                let record = row.map_err(|e| to_storage_err(e.to_string()))?;
                match record.rebuild_command() {
                    Ok(command) => commands.push(command),
                    Err(e) => {
                        tracing::error!(error = %e, "store: skipping undecodable row");
                    }
                }
            }
            Ok(commands)
        });
        match result {
            Ok(commands) => commands,
            Err(e) => {
                tracing::error!(error = %e, "store: query failed");
                Vec::new()
            }
        }
    }
}

impl CommandStore for SqliteCommandStore {
    fn process_id(&self) -> &str {
        &self.process_id
    }

    fn register(&self, command: &TrackingCommand) {
        if !command.is_retryable {
            return;
        }
        let record = match CommandRecord::from_command(command, &self.process_id) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, command_id = %command.id, "store: failed to encode command");
                return;
            }
        };
        let result = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO tracking_commands VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.command_id,
                    record.process_id,
                    record.data,
                    record.is_ready_on_background as i64,
                    record.created_at,
                    record.updated_at,
                ],
            )
            .map_err(|e| to_storage_err(e.to_string()))
        });
        match result {
            Ok(_) => tracing::debug!(command_id = %record.command_id, "store: registered command"),
            Err(e) => {
                tracing::error!(error = %e, command_id = %record.command_id, "store: failed to insert record");
            }
        }
    }

    fn unregister(&self, command: &TrackingCommand) {
        let result = self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM tracking_commands WHERE command_id = ?1",
                params![command.id],
            )
            .map_err(|e| to_storage_err(e.to_string()))
        });
        match result {
            Ok(_) => tracing::debug!(command_id = %command.id, "store: unregistered command"),
            Err(e) => {
                tracing::error!(error = %e, command_id = %command.id, "store: failed to delete record");
            }
        }
    }

    fn is_registered(&self, command: &TrackingCommand) -> bool {
        let result = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT 1 FROM tracking_commands WHERE command_id = ?1")
                .map_err(|e| to_storage_err(e.to_string()))?;
            stmt.exists(params![command.id])
                .map_err(|e| to_storage_err(e.to_string()))
        });
        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "store: existence check failed");
            false
        })
    }

    fn commands(&self) -> Vec<TrackingCommand> {
        self.fetch_commands(
            "SELECT * FROM tracking_commands
             WHERE process_id = ?1 AND created_at > ?2
             ORDER BY rowid",
            params![self.process_id, self.cutoff()],
        )
    }

    fn retryable_commands(&self) -> Vec<TrackingCommand> {
        self.fetch_commands(
            "SELECT * FROM tracking_commands
             WHERE process_id != ?1 AND created_at > ?2
             ORDER BY rowid",
            params![self.process_id, self.cutoff()],
        )
    }

    fn unprocessed_count(&self) -> u64 {
        let result = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM tracking_commands WHERE created_at > ?1",
                params![self.cutoff()],
                |row| row.get::<_, u64>(0),
            )
            .map_err(|e| to_storage_err(e.to_string()))
        });
        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "store: count failed");
            0
        })
    }

    fn unregister_all(&self) {
        let result = self.db.with_conn(|conn| {
            conn.execute("DELETE FROM tracking_commands", [])
                .map_err(|e| to_storage_err(e.to_string()))
        });
        match result {
            Ok(_) => tracing::debug!("store: deleted all records"),
            Err(e) => tracing::error!(error = %e, "store: failed to delete all records"),
        }
    }
}
