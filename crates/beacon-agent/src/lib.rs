//! # beacon-agent
//!
//! TrackingAgent — the assembled pipeline. Producers submit events; the
//! agent persists retryable commands ahead of the network write, bundles
//! them under the configured rules, drains bundles over the dispatcher,
//! and replays what a previous process instance left behind.

pub mod agent;
pub mod app_state;
pub mod backoff;
pub mod circuit_breaker;
mod executor;
mod task;

pub use agent::TrackingAgent;
pub use app_state::SharedAppState;
pub use backoff::{BackoffExhausted, ExponentialBackoff};
pub use circuit_breaker::CircuitBreaker;
pub use task::CommandCompletion;

pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
