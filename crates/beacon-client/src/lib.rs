//! # beacon-client
//!
//! The outbound half of the pipeline: the track wire protocol, the HTTP
//! transport, and the TrackClient dispatcher that drains completed bundles
//! while respecting reachability.

pub mod client;
pub mod protocol;
pub mod reachability;
pub mod transport;

pub use client::{TaskCompletion, TrackClient, TrackClientObserver, TrackClientState};
pub use protocol::{RequestKeys, TrackRequest, TrackResponse};
pub use reachability::ReachabilityWatcher;
pub use transport::{HttpTransport, TrackTransport, TransportFuture};

pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
