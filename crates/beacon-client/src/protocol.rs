//! Wire protocol for the track endpoint.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use beacon_core::{CommandBundle, Event};

/// Routing keys shared by every event in a request. Before-add bundling
/// rules guarantee a bundle is homogeneous, so these come from its first
/// command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestKeys {
    pub visitor_id: String,
    pub pv_id: String,
    pub original_pv_id: String,
    pub scene_id: String,
}

/// One track request: the serialized events of a single bundle plus the
/// routing keys they share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRequest {
    /// Unique request ID for tracing.
    pub request_id: String,
    /// Application key; also sent as a header.
    pub app_key: String,
    pub keys: RequestKeys,
    pub events: Vec<Event>,
    /// Whether this request replays previously failed commands.
    #[serde(default)]
    pub is_retry: bool,
}

impl TrackRequest {
    /// Build a request from a completed bundle. Returns None for an empty
    /// bundle.
    pub fn from_bundle(app_key: &str, bundle: &CommandBundle) -> Option<Self> {
        let first = bundle.first()?;
        let events = bundle
            .commands()
            .iter()
            .map(|command| {
                let mut event = command.event.clone();
                event.merge_additional_parameters(command.date, command.is_retry);
                event
            })
            .collect();
        Some(Self {
            request_id: Uuid::new_v4().to_string(),
            app_key: app_key.to_string(),
            keys: RequestKeys {
                visitor_id: first.visitor_id.clone(),
                pv_id: first.scene.pv_id.clone(),
                original_pv_id: first.scene.original_pv_id.clone(),
                scene_id: first.scene.scene_id.clone(),
            },
            events,
            is_retry: first.is_retry,
        })
    }
}

/// Response body of the track endpoint. The body is advisory; delivery is
/// judged on the HTTP status alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
    pub status: u16,
}
