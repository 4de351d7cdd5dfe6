/// Beacon system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Track endpoint path, relative to the configured base URL.
pub const TRACK_ENDPOINT_PATH: &str = "/v0/native/track";

/// Header carrying the application key.
pub const APP_KEY_HEADER: &str = "X-Beacon-App-Key";

/// Payload field stamped with the client-side event date at request time.
pub const FIELD_LOCAL_EVENT_DATE: &str = "_local_event_date";

/// Payload field marking a retransmitted event.
pub const FIELD_RETRY: &str = "_retry";
