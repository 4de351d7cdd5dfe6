//! Model invariants: event name classification, payload merging, command
//! identity, bundle freeze ordering.

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

use beacon_core::{CommandBundle, Event, EventName, SceneRef, TrackingCommand};

fn make_command(name: &str) -> TrackingCommand {
    TrackingCommand::new(
        Event::new(EventName::new(name)),
        "visitor-1",
        SceneRef::new("pv-1", "pv-1", "scene-1"),
    )
}

// ── Event names ───────────────────────────────────────────────────────────

#[test]
fn fetch_variables_is_not_retryable() {
    assert!(!EventName::fetch_variables().is_retryable());
    assert!(EventName::view().is_retryable());
    assert!(EventName::new("custom_purchase").is_retryable());
}

#[test]
fn initialization_events_are_not_ready_on_background() {
    let open = make_command("native_app_open");
    assert!(!open.is_ready_on_background);

    let view = make_command("view");
    assert!(view.is_ready_on_background);
}

// ── Payload merging ───────────────────────────────────────────────────────

#[test]
fn merge_is_recursive_for_nested_objects() {
    let mut values = Map::new();
    values.insert("user".to_string(), json!({"name": "a", "age": 1}));
    let mut event = Event::with_values(EventName::view(), values);

    let mut other = Map::new();
    other.insert("user".to_string(), json!({"age": 2, "plan": "pro"}));
    event.merge(other);

    assert_eq!(
        event.values.get("user"),
        Some(&json!({"name": "a", "age": 2, "plan": "pro"}))
    );
}

#[test]
fn additional_parameters_stamp_date_and_retry_flag() {
    let mut event = Event::new(EventName::view());
    let date = event.date;
    event.merge_additional_parameters(date, false);
    assert!(event.values.contains_key("_local_event_date"));
    assert!(!event.values.contains_key("_retry"));

    event.merge_additional_parameters(date, true);
    assert_eq!(event.values.get("_retry"), Some(&Value::Bool(true)));
}

// ── Command identity ──────────────────────────────────────────────────────

#[test]
fn command_equality_is_identity() {
    let a = make_command("view");
    let b = make_command("view");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn command_round_trips_through_json() {
    let command = make_command("view");
    let data = serde_json::to_string(&command).unwrap();
    let rebuilt: TrackingCommand = serde_json::from_str(&data).unwrap();
    assert_eq!(command, rebuilt);
    assert_eq!(rebuilt.visitor_id, "visitor-1");
    assert_eq!(rebuilt.scene.pv_id, "pv-1");
}

// ── Bundles ───────────────────────────────────────────────────────────────

#[test]
fn freeze_sorts_commands_by_date() {
    let mut late = make_command("view");
    late.date = Utc::now();
    let mut early = make_command("view");
    early.date = late.date - Duration::seconds(5);

    let mut bundle = CommandBundle::new();
    bundle.add_command(late.clone());
    bundle.add_command(early.clone());
    bundle.freeze();

    assert!(bundle.is_frozen());
    assert_eq!(bundle.first(), Some(&early));
    assert_eq!(bundle.last(), Some(&late));
}
