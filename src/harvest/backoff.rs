//! Exponential backoff policy for rate-limit rejections
//!
//! The policy only computes waits. Whether to retry at all is up to the
//! caller, which tracks attempts in a `RetryState`.

use crate::config::{secs, BackoffConfig};
use rand::Rng;
use std::time::Duration;

/// Maps a retry attempt to the wait that should precede the next request
///
/// Attempt 0 waits `initial_wait`, capped at `max_wait`. Every later attempt waits
/// `previous * factor` plus a uniform offset in `[-jitter, +jitter]`,
/// clamped to `[floor, max_wait]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_wait: Duration,
    pub factor: f64,
    pub jitter: Duration,
    pub floor: Duration,
    pub max_wait: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&BackoffConfig::default())
    }
}

impl BackoffPolicy {
    /// Builds a policy from its configuration section
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self {
            initial_wait: secs(config.initial_wait),
            factor: config.factor,
            jitter: secs(config.jitter),
            floor: secs(config.floor),
            max_wait: secs(config.max_wait),
        }
    }

    /// Computes the next wait using the thread-local random generator
    pub fn next_wait(&self, attempt: u32, previous: Duration) -> Duration {
        self.next_wait_with(&mut rand::thread_rng(), attempt, previous)
    }

    /// Computes the next wait drawing jitter from `rng`
    pub fn next_wait_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        attempt: u32,
        previous: Duration,
    ) -> Duration {
        if attempt == 0 {
            return self.initial_wait.min(self.cap());
        }

        let jitter = self.jitter.as_secs_f64();
        let offset = if jitter > 0.0 {
            rng.gen_range(-jitter..=jitter)
        } else {
            0.0
        };

        self.clamp(previous.as_secs_f64() * self.factor + offset)
    }

    fn cap(&self) -> Duration {
        self.max_wait.max(self.floor)
    }

    fn clamp(&self, seconds: f64) -> Duration {
        let floor = self.floor.as_secs_f64();
        secs(seconds.clamp(floor, self.cap().as_secs_f64()))
    }
}
