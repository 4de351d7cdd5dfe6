//! Row mapping between TrackingCommand and the tracking_commands table.
//! The command itself is stored as a JSON blob; the indexed columns exist
//! only for querying.

use beacon_core::errors::{BeaconResult, StorageError};
use beacon_core::TrackingCommand;

pub(crate) struct CommandRecord {
    pub command_id: String,
    pub process_id: String,
    pub data: String,
    pub is_ready_on_background: bool,
    pub created_at: f64,
    pub updated_at: f64,
}

impl CommandRecord {
    pub fn from_command(command: &TrackingCommand, process_id: &str) -> BeaconResult<Self> {
        let data = serde_json::to_string(command).map_err(|e| StorageError::CommandEncodeFailed {
            reason: e.to_string(),
        })?;
        let created_at = unix_seconds(command.date);
        Ok(Self {
            command_id: command.id.clone(),
            process_id: process_id.to_string(),
            data,
            is_ready_on_background: command.is_ready_on_background,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            command_id: row.get("command_id")?,
            process_id: row.get("process_id")?,
            data: row.get("data")?,
            is_ready_on_background: row.get::<_, i64>("is_ready_on_background")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn rebuild_command(&self) -> BeaconResult<TrackingCommand> {
        serde_json::from_str(&self.data).map_err(|e| {
            StorageError::RowDecodeFailed {
                command_id: self.command_id.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

pub(crate) fn unix_seconds(date: chrono::DateTime<chrono::Utc>) -> f64 {
    date.timestamp_millis() as f64 / 1_000.0
}
