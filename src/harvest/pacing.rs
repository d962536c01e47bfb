//! Politeness delays and cancellable sleeping
//!
//! Every wait in the harvester goes through `pause`, so a shutdown request
//! interrupts backoff sleeps, page delays, and inter-entity delays alike.

use crate::HarvestError;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A uniform random delay between `min` and `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// Creates a range, swapping the bounds if they are reversed
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A range that always yields `delay`
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    /// A range that never waits
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    /// Draws a delay using the thread-local random generator
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Draws a delay from `rng`
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        let secs = rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(self.min)
    }
}

/// Sleeps for `duration` unless `cancel` fires first
///
/// # Returns
///
/// * `Ok(())` - The full duration elapsed
/// * `Err(HarvestError::Interrupted)` - Cancellation was requested
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), HarvestError> {
    if cancel.is_cancelled() {
        return Err(HarvestError::Interrupted);
    }
    if duration.is_zero() {
        return Ok(());
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HarvestError::Interrupted),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
