//! Exponential backoff schedule for in-process command retries.

use std::time::Duration;

/// The schedule ran out of attempts; the command stays persisted for the
/// next launch instead.
#[derive(Debug, thiserror::Error)]
#[error("retry budget exhausted")]
pub struct BackoffExhausted;

/// Deterministic exponential backoff: `interval * multiplier^(n-1)` for the
/// n-th attempt, up to `max_count` attempts.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    interval: Duration,
    multiplier: u32,
    max_count: u32,
    count: u32,
}

impl ExponentialBackoff {
    pub fn new(interval: Duration, multiplier: u32, max_count: u32) -> Self {
        Self {
            interval,
            multiplier,
            max_count,
            count: 0,
        }
    }

    /// Delay before the next attempt, or `BackoffExhausted` once the
    /// attempt budget is spent.
    pub fn next_delay(&mut self) -> Result<Duration, BackoffExhausted> {
        self.count += 1;
        if self.count > self.max_count {
            return Err(BackoffExhausted);
        }
        let scale = (self.multiplier as f64).powi(self.count as i32 - 1);
        Ok(self.interval.mul_f64(scale))
    }

    pub fn attempts(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_by_the_multiplier() {
        let mut backoff = ExponentialBackoff::new(Duration::from_millis(500), 4, 6);
        assert_eq!(backoff.next_delay().unwrap(), Duration::from_millis(500));
        assert_eq!(backoff.next_delay().unwrap(), Duration::from_millis(2_000));
        assert_eq!(backoff.next_delay().unwrap(), Duration::from_millis(8_000));
    }

    #[test]
    fn schedule_exhausts_after_max_count() {
        let mut backoff = ExponentialBackoff::new(Duration::from_millis(500), 4, 2);
        assert!(backoff.next_delay().is_ok());
        assert!(backoff.next_delay().is_ok());
        assert!(backoff.next_delay().is_err());
    }
}
