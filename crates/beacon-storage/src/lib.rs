//! # beacon-storage
//!
//! SQLite persistence for retryable tracking commands: write-ahead rows
//! that survive process death between a command being accepted and its
//! bundle being acknowledged by the collector.

mod connection;
mod migrations;
mod record;
mod store;

pub use connection::Database;
pub use store::SqliteCommandStore;

use beacon_core::errors::{BeaconError, StorageError};

pub(crate) fn to_storage_err(message: impl Into<String>) -> BeaconError {
    StorageError::SqliteError {
        message: message.into(),
    }
    .into()
}
