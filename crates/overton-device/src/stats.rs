//! Connection statistics and the derived strength score
//!
//! Owned exclusively by a poller; only the derived [`ConnectionHealth`]
//! snapshot ever leaves the crate.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Latency samples kept in the rolling history
const LATENCY_HISTORY_CAP: usize = 10;
/// Average latency above this costs one strength point
const SLOW_RESPONSE: Duration = Duration::from_millis(500);
/// Going this long without a success costs two strength points
const STALE_SUCCESS: Duration = Duration::from_secs(5);

/// Rolling success/failure statistics for one poller
#[derive(Debug)]
pub struct ConnectionStats {
    success_count: u64,
    failure_count: u64,
    consecutive_failures: u32,
    last_success: Instant,
    latency_history: VecDeque<Duration>,
}

impl ConnectionStats {
    pub fn new(now: Instant) -> Self {
        Self {
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            last_success: now,
            latency_history: VecDeque::with_capacity(LATENCY_HISTORY_CAP),
        }
    }

    pub fn record_success(&mut self, latency: Duration, now: Instant) {
        self.success_count += 1;
        self.consecutive_failures = 0;
        self.last_success = now;

        if self.latency_history.len() >= LATENCY_HISTORY_CAP {
            self.latency_history.pop_front();
        }
        self.latency_history.push_back(latency);
    }

    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.consecutive_failures += 1;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Wipe everything, e.g. after a device-address change
    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    fn average_latency(&self) -> Duration {
        if self.latency_history.is_empty() {
            // No samples yet: assume slow rather than fast
            return Duration::from_secs(1);
        }
        let total: Duration = self.latency_history.iter().sum();
        total / self.latency_history.len() as u32
    }

    /// Advisory connection strength in [0, 5]
    ///
    /// Success ratio is the dominant term, penalized for consecutive
    /// failures, slow responses and time since the last success.
    pub fn strength(&self, now: Instant) -> u8 {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            return 0;
        }

        let success_rate = self.success_count as f64 / total as f64;
        let mut strength = success_rate * 5.0;

        if self.consecutive_failures > 0 {
            strength -= (self.consecutive_failures as f64 * 0.5).min(2.0);
        }

        if self.average_latency() > SLOW_RESPONSE {
            strength -= 1.0;
        }

        if now.duration_since(self.last_success) > STALE_SUCCESS {
            strength -= 2.0;
        }

        strength.round().clamp(0.0, 5.0) as u8
    }
}

/// Derived connection state published to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHealth {
    pub connected: bool,
    /// Advisory score in [0, 5]; always 0 for the digital variant
    pub strength: u8,
}

impl ConnectionHealth {
    pub fn down() -> Self {
        Self {
            connected: false,
            strength: 0,
        }
    }

    /// Publish over a watch channel, waking watchers only on change
    pub(crate) fn publish(self, tx: &tokio::sync::watch::Sender<Self>) {
        tx.send_if_modified(|current| {
            if *current != self {
                *current = self;
                true
            } else {
                false
            }
        });
    }
}
