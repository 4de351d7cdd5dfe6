//! Reachability watching. The dispatcher consumes a plain boolean signal;
//! this module provides the production poller that derives it by probing
//! the collector host. Tests and embedders with their own network monitor
//! drive `TrackClient::set_reachable` directly instead.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::errors::{BeaconResult, TransportError};

use crate::client::TrackClient;

/// Probes the collector on an interval and pushes transitions into the
/// client. Stops when dropped.
pub struct ReachabilityWatcher {
    handle: tokio::task::JoinHandle<()>,
}

impl ReachabilityWatcher {
    pub fn spawn(
        client: Arc<TrackClient>,
        base_url: String,
        interval: Duration,
    ) -> BeaconResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TransportError::NetworkError {
                reason: e.to_string(),
            })?;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reachable = http.head(&base_url).send().await.is_ok();
                client.set_reachable(reachable);
            }
        });
        Ok(Self { handle })
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ReachabilityWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
