use crate::harvest::BackoffPolicy;
use std::time::Duration;

/// Retry bookkeeping for one in-progress operation
///
/// Counts consecutive rate-limit rejections and carries the wait to use for
/// the next one. Each fetch operation owns its own `RetryState`; it is never
/// shared between unrelated operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// Consecutive rejections seen since the last forward progress
    attempt: u32,

    /// Wait to apply on the next rejection
    wait: Duration,

    /// Wait restored on progress
    initial_wait: Duration,

    /// Attempt budget; `attempt` never exceeds it
    max_attempts: u32,
}

impl RetryState {
    /// Creates a fresh retry state for an operation
    pub fn new(policy: &BackoffPolicy, max_attempts: u32) -> Self {
        let initial_wait = policy.next_wait(0, Duration::ZERO);
        Self {
            attempt: 0,
            wait: initial_wait,
            initial_wait,
            max_attempts,
        }
    }

    /// Number of consecutive rejections recorded
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Wait that the next rejection will sleep for
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Returns true while the attempt budget still allows another request
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Returns true once the attempt budget is spent
    pub fn is_exhausted(&self) -> bool {
        !self.can_retry()
    }

    /// Records a rate-limit rejection
    ///
    /// Every rejection is followed by a sleep, including the one that spends
    /// the budget. Check [`is_exhausted`](Self::is_exhausted) after sleeping
    /// to decide whether another request may go out.
    ///
    /// # Returns
    ///
    /// How long to sleep before the next request (or before giving up)
    pub fn record_rejection(&mut self, policy: &BackoffPolicy) -> Duration {
        self.attempt = (self.attempt + 1).min(self.max_attempts);
        let sleep = self.wait;
        self.wait = policy.next_wait(self.attempt, self.wait);
        sleep
    }

    /// Clears the state after forward progress
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.wait = self.initial_wait;
    }
}
