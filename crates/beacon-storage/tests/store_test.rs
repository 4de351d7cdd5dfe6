//! Repository semantics: registration rules, identity, process-instance
//! scoping across store handles on the same database.

use beacon_core::{CommandStore, Event, EventName, SceneRef, TrackingCommand};
use beacon_storage::SqliteCommandStore;

fn make_command(name: &str) -> TrackingCommand {
    TrackingCommand::new(
        Event::new(EventName::new(name)),
        "visitor-1",
        SceneRef::new("pv-1", "pv-1", "scene-1"),
    )
}

// ── Registration ──────────────────────────────────────────────────────────

#[test]
fn register_persists_retryable_commands() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    let command = make_command("view");

    store.register(&command);

    assert!(store.is_registered(&command));
    assert_eq!(store.commands(), vec![command]);
    assert_eq!(store.unprocessed_count(), 1);
}

#[test]
fn register_skips_non_retryable_commands() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    let command = make_command("_fetch_variables");

    store.register(&command);

    assert!(!store.is_registered(&command));
    assert_eq!(store.unprocessed_count(), 0);
}

#[test]
fn register_is_idempotent_by_command_id() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    let command = make_command("view");

    store.register(&command);
    store.register(&command);

    assert_eq!(store.commands().len(), 1);
}

#[test]
fn commands_come_back_in_insertion_order() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    let first = make_command("view");
    let second = make_command("identify");
    let third = make_command("view");

    store.register(&first);
    store.register(&second);
    store.register(&third);

    let commands = store.commands();
    let ids: Vec<&str> = commands.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str(), third.id.as_str()]);
}

// ── Unregistration ────────────────────────────────────────────────────────

#[test]
fn unregister_removes_the_row() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    let command = make_command("view");

    store.register(&command);
    store.unregister(&command);

    assert!(!store.is_registered(&command));
    assert_eq!(store.unprocessed_count(), 0);
}

#[test]
fn unregister_of_absent_command_is_a_noop() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    store.unregister(&make_command("view"));
    assert_eq!(store.unprocessed_count(), 0);
}

#[test]
fn unregister_all_clears_every_record() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    store.register(&make_command("view"));
    store.register(&make_command("identify"));

    store.unregister_all();

    assert_eq!(store.unprocessed_count(), 0);
    assert!(store.commands().is_empty());
}

// ── Process-instance scoping ──────────────────────────────────────────────

#[test]
fn own_commands_are_never_retryable_within_the_same_instance() {
    let store = SqliteCommandStore::open_in_memory().unwrap();
    store.register(&make_command("view"));

    assert!(store.retryable_commands().is_empty());
}

#[test]
fn a_fresh_instance_sees_survivors_as_retryable() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let command = make_command("view");

    // First launch registers a command and dies without unregistering.
    let first_launch = SqliteCommandStore::open(file.path()).unwrap();
    first_launch.register(&command);
    assert!(first_launch.retryable_commands().is_empty());
    drop(first_launch);

    // Second launch inherits the row.
    let second_launch = SqliteCommandStore::open(file.path()).unwrap();
    assert_eq!(second_launch.retryable_commands(), vec![command]);
    assert!(second_launch.commands().is_empty());
}

#[test]
fn survivor_payload_round_trips_intact() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut command = make_command("view");
    command.event.values.insert("screen".to_string(), serde_json::json!("home"));

    SqliteCommandStore::open(file.path()).unwrap().register(&command);

    let restored = SqliteCommandStore::open(file.path())
        .unwrap()
        .retryable_commands();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].visitor_id, "visitor-1");
    assert_eq!(
        restored[0].event.values.get("screen"),
        Some(&serde_json::json!("home"))
    );
    assert!(!restored[0].is_retry);
}
