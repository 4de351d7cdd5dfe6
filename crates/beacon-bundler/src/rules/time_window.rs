use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::AsyncBundleRule;

/// Flushes the current bundle once it has been quiet for one interval.
///
/// The flag is driven by the dispatcher's state: while the client is busy,
/// elapsed windows re-arm instead of closing, so commands accumulate into
/// one larger bundle that flushes on the next tick after the client goes
/// idle again.
#[derive(Debug)]
pub struct TimeWindowBundleRule {
    interval: Duration,
    immediately_bundlable: AtomicBool,
}

impl TimeWindowBundleRule {
    pub fn new(interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            interval,
            immediately_bundlable: AtomicBool::new(true),
        })
    }

    pub fn set_immediately_bundlable(&self, bundlable: bool) {
        self.immediately_bundlable.store(bundlable, Ordering::SeqCst);
    }
}

impl AsyncBundleRule for TimeWindowBundleRule {
    fn interval(&self) -> Duration {
        self.interval
    }

    fn is_immediately_bundlable(&self) -> bool {
        self.immediately_bundlable.load(Ordering::SeqCst)
    }
}
