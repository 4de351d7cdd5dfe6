//! End-to-end pipeline tests: submit → persist → bundle → send →
//! unregister, failure retention, breaker-capped retries, survivor replay,
//! and lifecycle gating.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_agent::{SharedAppState, TrackingAgent};
use beacon_client::{TrackClientState, TrackRequest, TrackResponse, TrackTransport, TransportFuture};
use beacon_core::errors::TransportError;
use beacon_core::{AppState, BeaconConfig, CommandStore, Event, EventName, SceneRef};
use beacon_storage::SqliteCommandStore;

#[derive(Default)]
struct StubTransport {
    fail: AtomicBool,
    requests: Mutex<Vec<TrackRequest>>,
}

impl StubTransport {
    fn failing() -> Self {
        let stub = Self::default();
        stub.fail.store(true, Ordering::SeqCst);
        stub
    }

    fn requests(&self) -> Vec<TrackRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl TrackTransport for StubTransport {
    fn send(&self, request: TrackRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request);
            if self.fail.load(Ordering::SeqCst) {
                Err(TransportError::HttpStatus { status: 500 })
            } else {
                Ok(TrackResponse {
                    success: true,
                    status: 200,
                })
            }
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("beacon=debug")
        .try_init();
}

fn test_config() -> BeaconConfig {
    BeaconConfig {
        app_key: "test-app-key".to_string(),
        ..BeaconConfig::default()
    }
}

fn scene() -> SceneRef {
    SceneRef::new("pv-1", "pv-1", "scene-1")
}

#[tokio::test(start_paused = true)]
async fn submitted_commands_are_persisted_sent_and_unregistered() {
    init_tracing();
    let transport = Arc::new(StubTransport::default());
    let store = Arc::new(SqliteCommandStore::open_in_memory().unwrap());
    let agent = TrackingAgent::new(
        &test_config(),
        store.clone(),
        transport.clone(),
        &SharedAppState::default(),
    );

    let completions = Arc::new(AtomicUsize::new(0));
    let counter = completions.clone();
    agent.submit_with_completion(
        Event::new(EventName::view()),
        "visitor-1",
        scene(),
        move |delivered| {
            assert!(delivered);
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );
    tokio::time::sleep(Duration::from_millis(500)).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].keys.visitor_id, "visitor-1");
    assert_eq!(requests[0].events.len(), 1);
    assert!(!requests[0].is_retry);

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(store.unprocessed_count(), 0);
    assert_eq!(agent.client().state(), TrackClientState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn commands_submitted_together_share_one_request() {
    init_tracing();
    let transport = Arc::new(StubTransport::default());
    let store = Arc::new(SqliteCommandStore::open_in_memory().unwrap());
    let agent = TrackingAgent::new(
        &test_config(),
        store.clone(),
        transport.clone(),
        &SharedAppState::default(),
    );

    agent.submit(Event::new(EventName::view()), "visitor-1", scene());
    agent.submit(Event::new(EventName::identify()), "visitor-1", scene());
    tokio::time::sleep(Duration::from_millis(500)).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].events.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failures_keep_commands_registered_and_retry_until_the_breaker_opens() {
    init_tracing();
    let transport = Arc::new(StubTransport::failing());
    let store = Arc::new(SqliteCommandStore::open_in_memory().unwrap());
    let agent = TrackingAgent::new(
        &test_config(),
        store.clone(),
        transport.clone(),
        &SharedAppState::default(),
    );

    let completions = Arc::new(AtomicUsize::new(0));
    let outcome = Arc::new(Mutex::new(None));
    let counter = completions.clone();
    let slot = outcome.clone();
    agent.submit_with_completion(
        Event::new(EventName::view()),
        "visitor-1",
        scene(),
        move |delivered| {
            counter.fetch_add(1, Ordering::SeqCst);
            *slot.lock().unwrap() = Some(delivered);
        },
    );
    tokio::time::sleep(Duration::from_secs(60)).await;

    // Initial send plus in-process retries until three consecutive
    // failures open the breaker.
    assert_eq!(transport.request_count(), 3);
    assert!(transport.requests()[1].is_retry);

    // The completion fired exactly once, on the first failure.
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(*outcome.lock().unwrap(), Some(false));

    // The command survives for the next launch.
    assert_eq!(store.commands().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn a_new_agent_replays_survivors_from_a_previous_instance() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();

    // A previous instance persisted a command and died before the send
    // was acknowledged.
    {
        let previous = SqliteCommandStore::open(file.path()).unwrap();
        let command = beacon_core::TrackingCommand::new(
            Event::new(EventName::view()),
            "visitor-1",
            scene(),
        );
        previous.register(&command);
    }

    let transport = Arc::new(StubTransport::default());
    let store = Arc::new(SqliteCommandStore::open(file.path()).unwrap());
    let agent = TrackingAgent::new(
        &test_config(),
        store.clone(),
        transport.clone(),
        &SharedAppState::default(),
    );
    tokio::time::sleep(Duration::from_secs(5)).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].is_retry);
    assert_eq!(
        requests[0].events[0].values.get("_retry"),
        Some(&serde_json::Value::Bool(true))
    );
    assert_eq!(store.unprocessed_count(), 0);
    assert_eq!(agent.client().state(), TrackClientState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn background_delays_initialization_events_until_foreground() {
    init_tracing();
    let transport = Arc::new(StubTransport::default());
    let store = Arc::new(SqliteCommandStore::open_in_memory().unwrap());
    let app_state = SharedAppState::new(AppState::Background);
    let agent = TrackingAgent::new(&test_config(), store.clone(), transport.clone(), &app_state);

    agent.submit(Event::new(EventName::native_app_open()), "visitor-1", scene());
    tokio::time::sleep(Duration::from_secs(2)).await;

    // Persisted ahead of bundling, but held back from the network.
    assert_eq!(transport.request_count(), 0);
    assert_eq!(store.commands().len(), 1);

    app_state.set(AppState::Active);
    agent.notify_app_state(AppState::Active);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(store.unprocessed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn offline_submissions_accumulate_and_flush_on_reachability() {
    init_tracing();
    let transport = Arc::new(StubTransport::default());
    let store = Arc::new(SqliteCommandStore::open_in_memory().unwrap());
    let agent = TrackingAgent::new(
        &test_config(),
        store.clone(),
        transport.clone(),
        &SharedAppState::default(),
    );

    agent.set_reachable(false);
    for _ in 0..3 {
        agent.submit(Event::new(EventName::view()), "visitor-1", scene());
    }
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(transport.request_count(), 0);
    assert!(agent.client().queue_len() >= 1);

    agent.set_reachable(true);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let delivered: usize = transport.requests().iter().map(|r| r.events.len()).sum();
    assert_eq!(delivered, 3);
    assert_eq!(store.unprocessed_count(), 0);
    assert_eq!(agent.client().state(), TrackClientState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_events_are_sent_but_never_persisted() {
    init_tracing();
    let transport = Arc::new(StubTransport::default());
    let store = Arc::new(SqliteCommandStore::open_in_memory().unwrap());
    let agent = TrackingAgent::new(
        &test_config(),
        store.clone(),
        transport.clone(),
        &SharedAppState::default(),
    );

    let command = agent.submit(Event::new(EventName::fetch_variables()), "visitor-1", scene());
    assert!(!command.is_retryable);
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(store.unprocessed_count(), 0);
    assert!(store.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn teardown_clears_persisted_state() {
    init_tracing();
    let transport = Arc::new(StubTransport::failing());
    let store = Arc::new(SqliteCommandStore::open_in_memory().unwrap());
    let agent = TrackingAgent::new(
        &test_config(),
        store.clone(),
        transport.clone(),
        &SharedAppState::default(),
    );

    agent.submit(Event::new(EventName::view()), "visitor-1", scene());
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.commands().len(), 1);

    agent.teardown();
    assert_eq!(store.unprocessed_count(), 0);
    assert_eq!(agent.client().queue_len(), 0);
}
