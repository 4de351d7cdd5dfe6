//! TrackingCommand — one unit of tracking work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// Page-view and scene routing captured at submission time. Commands from
/// different pages or scenes never share a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRef {
    pub pv_id: String,
    pub original_pv_id: String,
    pub scene_id: String,
}

impl SceneRef {
    pub fn new(
        pv_id: impl Into<String>,
        original_pv_id: impl Into<String>,
        scene_id: impl Into<String>,
    ) -> Self {
        Self {
            pv_id: pv_id.into(),
            original_pv_id: original_pv_id.into(),
            scene_id: scene_id.into(),
        }
    }
}

/// One unit of tracking work: an event plus the routing metadata captured
/// when it was submitted.
///
/// Serialized commands are stored in the database; field changes must stay
/// backward compatible with previously persisted rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingCommand {
    /// UUID v4 identity. Equality and repository keys use this alone.
    pub id: String,
    pub event: Event,
    pub scene: SceneRef,
    pub visitor_id: String,
    /// Initialization events wait for the foreground; everything else may
    /// be bundled while the application is backgrounded.
    pub is_ready_on_background: bool,
    /// Non-retryable commands are never persisted or replayed.
    pub is_retryable: bool,
    /// Set by the retry path before re-submission. Not persisted.
    #[serde(skip)]
    pub is_retry: bool,
    /// Occurrence time, copied from the event.
    pub date: DateTime<Utc>,
}

impl TrackingCommand {
    pub fn new(event: Event, visitor_id: impl Into<String>, scene: SceneRef) -> Self {
        let is_ready_on_background = !event.event_name.is_initialization_event();
        let is_retryable = event.is_retryable();
        let date = event.date;
        Self {
            id: Uuid::new_v4().to_string(),
            event,
            scene,
            visitor_id: visitor_id.into(),
            is_ready_on_background,
            is_retryable,
            is_retry: false,
            date,
        }
    }
}

impl PartialEq for TrackingCommand {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TrackingCommand {}
