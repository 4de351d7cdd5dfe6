use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Named defaults, mirroring production tuning.
pub mod defaults {
    pub const DEFAULT_BASE_URL: &str = "https://track.beacon-sdk.io";
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 1;
    pub const DEFAULT_COMMAND_COUNT_THRESHOLD: usize = 10;
    pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 100;
    pub const DEFAULT_RETRY_FLUSH_INTERVAL_MS: u64 = 1_000;
    pub const DEFAULT_COMMAND_RETENTION_DAYS: i64 = 30;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Collector base URL.
    pub base_url: String,
    /// Application key sent with every request.
    pub app_key: String,
    /// Maximum simultaneously in-flight track requests.
    pub max_in_flight: usize,
    /// After-add rule threshold: close the bundle at this many commands.
    pub command_count_threshold: usize,
    /// Time-window rule interval for the default path (milliseconds).
    pub flush_interval_ms: u64,
    /// Time-window rule interval for the retry path (milliseconds).
    pub retry_flush_interval_ms: u64,
    /// SQLite database path. `None` selects an in-memory store.
    pub database_path: Option<PathBuf>,
    /// Persisted commands older than this are ignored on restore.
    pub command_retention_days: i64,
    /// Per-request timeout (seconds).
    pub request_timeout_secs: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            app_key: String::new(),
            max_in_flight: defaults::DEFAULT_MAX_IN_FLIGHT,
            command_count_threshold: defaults::DEFAULT_COMMAND_COUNT_THRESHOLD,
            flush_interval_ms: defaults::DEFAULT_FLUSH_INTERVAL_MS,
            retry_flush_interval_ms: defaults::DEFAULT_RETRY_FLUSH_INTERVAL_MS,
            database_path: None,
            command_retention_days: defaults::DEFAULT_COMMAND_RETENTION_DAYS,
            request_timeout_secs: defaults::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
