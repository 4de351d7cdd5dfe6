/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed: {reason}")]
    MigrationFailed { reason: String },

    #[error("row decode failed for command {command_id}: {reason}")]
    RowDecodeFailed { command_id: String, reason: String },

    #[error("command encode failed: {reason}")]
    CommandEncodeFailed { reason: String },
}
