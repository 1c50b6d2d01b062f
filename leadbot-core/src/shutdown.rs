//! Cooperative shutdown signal shared by the scan cycle and exit monitor.
//!
//! Both loops check it at the top of every iteration and sleep through it,
//! so a stop request is observed within one polling interval. Nothing is
//! ever killed while holding the position lock or mid-write.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Shutdown {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every waiting loop.
    pub fn signal(&self) {
        *self.stopped.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    pub fn is_signalled(&self) -> bool {
        *self.stopped.lock().unwrap()
    }

    /// Sleep for `timeout`, waking early on a shutdown signal.
    ///
    /// Returns `true` when shutdown was signalled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = self.stopped.lock().unwrap();
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .condvar
                .wait_timeout(stopped, deadline - now)
                .unwrap();
            stopped = guard;
        }
        true
    }
}
