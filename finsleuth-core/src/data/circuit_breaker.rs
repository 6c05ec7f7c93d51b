//! Circuit breaker for data provider rate limiting and IP bans.
//!
//! When the provider returns HTTP 403 (IP ban) or repeated 429 (rate limit),
//! the breaker trips and refuses all requests for a cooldown period
//! (default 30 minutes). Remaining tickers then fail fast instead of
//! hanging on retries.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// State of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation; requests are allowed.
    Closed,
    /// Tripped; all requests are refused until cooldown expires.
    Open { tripped_at: Instant },
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
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// 30-minute cooldown, trips after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60), 3)
    }

    // `Inner` holds plain values only; a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if requests are currently allowed. Resets the breaker once the cooldown has passed.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } if tripped_at.elapsed() >= self.cooldown => {
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                true
            }
            BreakerState::Open { .. } => false,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    /// Record a successful request and reset the failure counter.
    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    /// Record a failure; trips the breaker once the threshold is reached.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
        }
    }

    /// Immediately trip the breaker (for 403 Forbidden / IP ban).
    pub fn trip(&self) {
        self.lock().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    /// Remaining cooldown time (zero if not tripped).
    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        assert!(cb.is_allowed());
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.remaining_cooldown(), Duration::ZERO);
    }

    #[test]
    fn trips_after_threshold_failures() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
        assert!(cb.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn immediate_trip() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.trip();
        assert!(!cb.is_allowed());
    }

    #[test]
    fn success_resets_counter() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert!(cb.is_allowed());
    }

    #[test]
    fn expires_after_cooldown() {
        let cb = CircuitBreaker::new(Duration::from_millis(10), 3);
        cb.trip();
        assert!(!cb.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.is_allowed());
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 0);
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
    }
}
