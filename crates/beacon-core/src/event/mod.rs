//! Event model. Payloads are opaque to the pipeline; only the name-derived
//! routing flags are inspected.

mod name;

pub use name::EventName;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{FIELD_LOCAL_EVENT_DATE, FIELD_RETRY};

/// A single telemetry event produced by application code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name. Lowercase letters, digits, and underscores; names that
    /// start with an underscore are reserved for system events.
    pub event_name: EventName,
    /// Custom fields attached to the event. Passed through unchanged.
    #[serde(default)]
    pub values: Map<String, Value>,
    /// Client-side occurrence time.
    pub date: DateTime<Utc>,
}

impl Event {
    /// Create an event with an empty payload, dated now.
    pub fn new(event_name: EventName) -> Self {
        Self {
            event_name,
            values: Map::new(),
            date: Utc::now(),
        }
    }

    /// Create an event with a payload, dated now.
    pub fn with_values(event_name: EventName, values: Map<String, Value>) -> Self {
        Self {
            event_name,
            values,
            date: Utc::now(),
        }
    }

    /// Whether a command wrapping this event may be persisted and replayed.
    pub fn is_retryable(&self) -> bool {
        self.event_name.is_retryable()
    }

    /// Deep-merge custom fields into the payload. Nested objects merge
    /// recursively; scalar conflicts take the incoming value.
    pub fn merge(&mut self, other: Map<String, Value>) {
        merge_recursive(&mut self.values, other);
    }

    /// Stamp the transport-only parameters onto the payload before the
    /// event is serialized into a request body.
    pub fn merge_additional_parameters(&mut self, date: DateTime<Utc>, is_retry: bool) {
        let mut other = Map::new();
        other.insert(
            FIELD_LOCAL_EVENT_DATE.to_string(),
            Value::String(date.to_rfc3339()),
        );
        if is_retry {
            other.insert(FIELD_RETRY.to_string(), Value::Bool(true));
        }
        self.merge(other);
    }
}

fn merge_recursive(dst: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, incoming) in src {
        let merged = match dst.remove(&key) {
            Some(Value::Object(mut existing)) => match incoming {
                Value::Object(incoming) => {
                    merge_recursive(&mut existing, incoming);
                    Value::Object(existing)
                }
                other => other,
            },
            _ => incoming,
        };
        dst.insert(key, merged);
    }
}
