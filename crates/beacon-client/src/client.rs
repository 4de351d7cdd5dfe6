//! TrackClient — FIFO dispatcher for completed bundles. Respects
//! reachability, caps concurrent sends, and exposes a coarse run state.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use beacon_core::errors::TransportError;

use crate::lock;
use crate::protocol::{TrackRequest, TrackResponse};
use crate::transport::TrackTransport;

/// Coarse run state. `Waiting` exactly when the queue is empty and nothing
/// is in flight; reachability does not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackClientState {
    Waiting,
    Running,
}

/// Notified on every state transition. The time-window bundling rules use
/// this to suppress flushing while the client is busy.
pub trait TrackClientObserver: Send + Sync {
    fn did_change_state(&self, state: TrackClientState);
}

/// Invoked exactly once per enqueued request, after the send succeeds or
/// fails. Failed tasks are not re-enqueued; re-submission is the caller's
/// decision.
pub type TaskCompletion = Box<dyn FnOnce(Result<TrackResponse, TransportError>) + Send>;

struct ClientTask {
    request: TrackRequest,
    completion: TaskCompletion,
}

struct ClientInner {
    queue: VecDeque<ClientTask>,
    in_flight: usize,
    reachable: bool,
    state: TrackClientState,
}

/// The dispatcher. All queue and state mutation is serialized through one
/// mutex; completions run outside it so they may re-enter the client.
pub struct TrackClient {
    self_ref: Weak<Self>,
    inner: Mutex<ClientInner>,
    observers: Mutex<Vec<Arc<dyn TrackClientObserver>>>,
    empty_listeners: Mutex<Vec<Box<dyn Fn() + Send + Sync>>>,
    transport: Arc<dyn TrackTransport>,
    max_in_flight: usize,
    runtime: tokio::runtime::Handle,
}

impl TrackClient {
    /// Create a dispatcher. Must be constructed inside a tokio runtime;
    /// sends run on that runtime regardless of which thread enqueues.
    /// Starts `Waiting` and optimistically reachable; the reachability
    /// watcher corrects the flag once it knows better.
    pub fn new(transport: Arc<dyn TrackTransport>, max_in_flight: usize) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            inner: Mutex::new(ClientInner {
                queue: VecDeque::new(),
                in_flight: 0,
                reachable: true,
                state: TrackClientState::Waiting,
            }),
            observers: Mutex::new(Vec::new()),
            empty_listeners: Mutex::new(Vec::new()),
            transport,
            max_in_flight: max_in_flight.max(1),
            runtime: tokio::runtime::Handle::current(),
        })
    }

    /// Append a request to the queue and start sending if allowed.
    pub fn enqueue(&self, request: TrackRequest, completion: TaskCompletion) {
        {
            let mut inner = lock(&self.inner);
            inner.queue.push_back(ClientTask {
                request,
                completion,
            });
        }
        self.pump();
    }

    /// Record a reachability transition. Losing reachability lets in-flight
    /// sends finish naturally and stops starting new ones; regaining it
    /// resumes from the front of the queue.
    pub fn set_reachable(&self, reachable: bool) {
        {
            let mut inner = lock(&self.inner);
            if inner.reachable == reachable {
                return;
            }
            inner.reachable = reachable;
        }
        tracing::info!(reachable, "client: reachability changed");
        self.pump();
    }

    pub fn add_observer(&self, observer: Arc<dyn TrackClientObserver>) {
        lock(&self.observers).push(observer);
    }

    /// Register a callback for the "no pending commands" notification,
    /// fired on the running-to-waiting transition.
    pub fn on_no_pending_commands(&self, listener: impl Fn() + Send + Sync + 'static) {
        lock(&self.empty_listeners).push(Box::new(listener));
    }

    pub fn state(&self) -> TrackClientState {
        lock(&self.inner).state
    }

    pub fn queue_len(&self) -> usize {
        lock(&self.inner).queue.len()
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.inner).in_flight
    }

    pub fn is_reachable(&self) -> bool {
        lock(&self.inner).reachable
    }

    /// Drop all pending work and listeners. Completions of dropped tasks
    /// never fire; in-flight sends finish but their results are discarded
    /// by whoever registered them.
    pub fn teardown(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.queue.clear();
            inner.state = TrackClientState::Waiting;
        }
        lock(&self.observers).clear();
        lock(&self.empty_listeners).clear();
        tracing::debug!("client: teardown complete");
    }

    /// Start as many queued sends as reachability and the in-flight cap
    /// allow, then reconcile the run state.
    fn pump(&self) {
        let mut to_send = Vec::new();
        let transition = {
            let mut inner = lock(&self.inner);
            while inner.reachable && inner.in_flight < self.max_in_flight {
                let Some(task) = inner.queue.pop_front() else {
                    break;
                };
                inner.in_flight += 1;
                to_send.push(task);
            }
            Self::refresh_state(&mut inner)
        };
        for task in to_send {
            self.spawn_send(task);
        }
        self.notify(transition);
    }

    fn refresh_state(inner: &mut ClientInner) -> Option<TrackClientState> {
        let next = if inner.queue.is_empty() && inner.in_flight == 0 {
            TrackClientState::Waiting
        } else {
            TrackClientState::Running
        };
        if next != inner.state {
            inner.state = next;
            Some(next)
        } else {
            None
        }
    }

    fn notify(&self, transition: Option<TrackClientState>) {
        let Some(state) = transition else {
            return;
        };
        let observers: Vec<_> = lock(&self.observers).clone();
        for observer in &observers {
            observer.did_change_state(state);
        }
        if state == TrackClientState::Waiting {
            tracing::debug!("client: no pending commands");
            let listeners = lock(&self.empty_listeners);
            for listener in listeners.iter() {
                listener();
            }
        }
    }

    fn spawn_send(&self, task: ClientTask) {
        let Some(client) = self.self_ref.upgrade() else {
            return;
        };
        let transport = Arc::clone(&self.transport);
        self.runtime.spawn(async move {
            let request_id = task.request.request_id.clone();
            tracing::debug!(request_id = %request_id, retry = task.request.is_retry, "client: request start");
            let result = transport.send(task.request).await;
            tracing::debug!(request_id = %request_id, success = result.is_ok(), "client: request end");
            client.finish_task(task.completion, result);
        });
    }

    fn finish_task(
        &self,
        completion: TaskCompletion,
        result: Result<TrackResponse, TransportError>,
    ) {
        {
            let mut inner = lock(&self.inner);
            inner.in_flight -= 1;
        }
        completion(result);
        self.pump();
    }
}
