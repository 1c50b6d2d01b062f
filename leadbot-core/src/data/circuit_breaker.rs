//! Circuit breaker for the exchange's public API.
//!
//! Upbit enforces request-rate limits; after repeated failures or an HTTP
//! 429 the breaker opens and refuses requests until a cooldown expires,
//! instead of hammering the exchange while it is throttling us.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed,
    Open { since: Instant },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    consecutive_failures: Mutex<u32>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            state: Mutex::new(BreakerState::Closed),
            consecutive_failures: Mutex::new(0),
            cooldown,
            failure_threshold,
        }
    }

    /// Default for the public API: 60 s cooldown, opens after 5 consecutive
    /// failures.
    pub fn default_public_api() -> Self {
        Self::new(Duration::from_secs(60), 5)
    }

    /// Whether a request may be sent right now. An expired cooldown closes
    /// the breaker again.
    pub fn is_allowed(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        match *state {
            BreakerState::Closed => true,
            BreakerState::Open { since } => {
                if since.elapsed() >= self.cooldown {
                    *state = BreakerState::Closed;
                    *self.consecutive_failures.lock().unwrap() = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        *self.consecutive_failures.lock().unwrap() = 0;
    }

    /// Count a failure; at the threshold the breaker opens.
    pub fn record_failure(&self) {
        let mut failures = self.consecutive_failures.lock().unwrap();
        *failures += 1;
        if *failures >= self.failure_threshold {
            *self.state.lock().unwrap() = BreakerState::Open {
                since: Instant::now(),
            };
        }
    }

    /// Open immediately (rate-limit response from the exchange).
    pub fn open(&self) {
        *self.state.lock().unwrap() = BreakerState::Open {
            since: Instant::now(),
        };
    }
}
