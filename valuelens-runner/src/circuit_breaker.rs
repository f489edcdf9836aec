//! Circuit breaker for the quote provider.
//!
//! Three consecutive failed quote requests, or a single HTTP 403, open the
//! breaker. While open, the provider reports itself unavailable and the feed
//! serves synthetic data instead of hammering the endpoint. The breaker
//! closes again once the cooldown has elapsed.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Consecutive failures that open the breaker.
pub const FAILURE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open { since: Instant },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
        }
    }

    /// Five-minute cooldown: fifteen polling cycles at the default cadence.
    pub fn for_quotes() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }

    // A poisoned lock still holds a consistent counter; keep using it.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether a request may go out now. Closes an expired open breaker.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { since } if since.elapsed() >= self.cooldown => {
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                true
            }
            BreakerState::Open { .. } => false,
        }
    }

    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= FAILURE_THRESHOLD {
            inner.state = BreakerState::Open {
                since: Instant::now(),
            };
        }
    }

    /// Open immediately (provider refused us outright).
    pub fn trip(&self) {
        self.lock().state = BreakerState::Open {
            since: Instant::now(),
        };
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { since } => self.cooldown.saturating_sub(since.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        assert!(cb.is_allowed());
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.remaining_cooldown(), Duration::ZERO);
    }

    #[test]
    fn opens_after_threshold() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
        assert!(cb.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn success_resets_the_count() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert!(cb.is_allowed());
    }

    #[test]
    fn trip_opens_immediately() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.trip();
        assert!(!cb.is_allowed());
    }

    #[test]
    fn zero_cooldown_closes_on_next_check() {
        let cb = CircuitBreaker::new(Duration::ZERO);
        cb.trip();
        assert!(cb.is_allowed());
        assert_eq!(cb.state(), BreakerState::Closed);
    }
}
