//! Per-host politeness
//!
//! Each host gets a "next free slot" instant. A worker reserves the slot
//! under the lock, pushes it forward by the configured delay and then
//! sleeps until its slot, so concurrent workers hitting the same host are
//! spaced out instead of all waking at once.

use crate::url::extract_host;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Tracks the next allowed request time per host
#[derive(Debug)]
pub struct HostThrottle {
    delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostThrottle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a throttle from a delay in milliseconds
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn is_enabled(&self) -> bool {
        !self.delay.is_zero()
    }

    /// Reserves the next request slot for the URL's host
    ///
    /// Returns how long the caller must wait before sending.
    pub fn reserve(&self, url: &str, now: Instant) -> Duration {
        if !self.is_enabled() {
            return Duration::ZERO;
        }

        let host = match extract_host(url) {
            Some(host) => host,
            None => return Duration::ZERO,
        };

        let mut slots = self
            .next_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let slot = match slots.get(&host) {
            Some(next) if *next > now => *next,
            _ => now,
        };
        slots.insert(host, slot + self.delay);

        slot.saturating_duration_since(now)
    }

    /// Waits until a request to the URL's host is allowed
    pub async fn wait(&self, url: &str) {
        let wait = self.reserve(url, Instant::now());
        if !wait.is_zero() {
            tracing::trace!("Throttling {} for {:?}", url, wait);
            tokio::time::sleep(wait).await;
        }
    }
}
