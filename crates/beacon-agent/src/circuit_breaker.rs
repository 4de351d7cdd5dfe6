//! Failure breaker for the in-process retry path.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::lock;

const RECOVER_AFTER: Duration = Duration::from_secs(300);

struct BreakerState {
    failure_count: u32,
    last_failed_at: Option<Instant>,
}

/// Counts consecutive send failures. Once the threshold is reached, no new
/// in-process retries are scheduled until a success resets the breaker or
/// the recovery window passes; persisted commands remain for the next
/// launch either way.
pub struct CircuitBreaker {
    threshold: u32,
    recover_after: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, recover_after: Duration) -> Self {
        Self {
            threshold,
            recover_after,
            state: Mutex::new(BreakerState {
                failure_count: 0,
                last_failed_at: None,
            }),
        }
    }

    pub fn can_request(&self) -> bool {
        let mut state = lock(&self.state);
        if let Some(at) = state.last_failed_at {
            if at.elapsed() > self.recover_after {
                state.failure_count = 0;
                state.last_failed_at = None;
            }
        }
        state.failure_count < self.threshold
    }

    pub fn count_failure(&self) {
        let mut state = lock(&self.state);
        state.failure_count += 1;
        state.last_failed_at = Some(Instant::now());
    }

    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.failure_count = 0;
        state.last_failed_at = None;
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(3, RECOVER_AFTER)
    }
}
