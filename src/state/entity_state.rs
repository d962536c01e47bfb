/// Per-entity lifecycle states used by the batch orchestrator
///
/// Lifecycle: `Pending -> Fetching -> {Succeeded, Skipped, RetryBackoff, Failed}`.
/// `RetryBackoff` returns to `Fetching` until the attempt budget is spent, then
/// moves to `Failed`. Every terminal state passes through `InterEntityDelay`
/// before the next entity starts at `Pending`.
use crate::HarvestError;
use std::fmt;

/// Represents where one entity is in its processing lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    // ===== Active States =====
    /// Waiting to be processed
    Pending,

    /// Harvest in progress
    Fetching,

    /// Sleeping after a rate-limit rejection
    RetryBackoff,

    // ===== Terminal States =====
    /// Records were harvested
    Succeeded,

    /// Profile could not be resolved
    Skipped,

    /// Retries exhausted or an unexpected error occurred
    Failed,

    // ===== Special States =====
    /// Pausing before the next entity
    InterEntityDelay,
}

impl EntityState {
    /// Returns true for the outcome states
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: EntityState) -> bool {
        use EntityState::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Fetching, Succeeded)
                | (Fetching, Skipped)
                | (Fetching, RetryBackoff)
                | (Fetching, Failed)
                | (RetryBackoff, Fetching)
                | (RetryBackoff, Failed)
                | (Succeeded, InterEntityDelay)
                | (Skipped, InterEntityDelay)
                | (Failed, InterEntityDelay)
                | (InterEntityDelay, Pending)
        )
    }

    /// Short label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::RetryBackoff => "retry_backoff",
            Self::Succeeded => "succeeded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::InterEntityDelay => "inter_entity_delay",
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the state of a single entity and rejects illegal transitions
#[derive(Debug, Clone)]
pub struct EntityTracker {
    entity: String,
    state: EntityState,
}

impl EntityTracker {
    /// Starts tracking an entity in the `Pending` state
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            state: EntityState::Pending,
        }
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Moves to `next`, failing if the transition is not allowed
    pub fn advance(&mut self, next: EntityState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                entity: self.entity.clone(),
                from: self.state,
                to: next,
            });
        }

        tracing::trace!(entity = %self.entity, from = %self.state, to = %next, "entity transition");
        self.state = next;
        Ok(())
    }
}
