use crate::state::EntityState;
use std::time::Duration;

/// How one entity ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityOutcome {
    pub entity: String,

    /// Terminal state: `Succeeded`, `Skipped`, or `Failed`
    pub state: EntityState,

    /// Skip or failure reason, or the partial-failure note for a success
    pub reason: Option<String>,

    /// Entity-level rate-limit retries spent on the profile lookup
    pub retries: u32,

    /// Records contributed to the dataset (profile plus content)
    pub records: usize,
}

impl EntityOutcome {
    pub fn new(entity: &str, state: EntityState, reason: Option<String>) -> Self {
        Self {
            entity: entity.to_string(),
            state,
            reason,
            retries: 0,
            records: 0,
        }
    }
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Entities in the input list
    pub total_entities: usize,

    /// One outcome per processed entity, in processing order
    pub outcomes: Vec<EntityOutcome>,

    /// True if shutdown was requested before the list was exhausted
    pub interrupted: bool,

    pub elapsed: Duration,
}

impl RunReport {
    pub fn new(total_entities: usize) -> Self {
        Self {
            total_entities,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: EntityOutcome) {
        self.outcomes.push(outcome);
    }

    fn count(&self, state: EntityState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(EntityState::Succeeded)
    }

    pub fn skipped(&self) -> usize {
        self.count(EntityState::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(EntityState::Failed)
    }

    /// Successes whose content was cut short
    pub fn partial(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == EntityState::Succeeded && o.reason.is_some())
            .count()
    }

    /// Entities never reached because the run was interrupted
    pub fn unprocessed(&self) -> usize {
        self.total_entities.saturating_sub(self.outcomes.len())
    }

    pub fn outcome(&self, entity: &str) -> Option<&EntityOutcome> {
        self.outcomes.iter().find(|o| o.entity == entity)
    }
}
