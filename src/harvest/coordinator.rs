//! Batch orchestration
//!
//! This module walks the entity list in order, retries profile lookups that
//! were rate limited, paces consecutive entities, and accumulates every
//! successful result into a single `BatchDataset`.

use crate::harvest::entity::EntityHarvester;
use crate::harvest::pacing::pause;
use crate::harvest::report::{EntityOutcome, RunReport};
use crate::harvest::settings::HarvestSettings;
use crate::harvest::source::TimelineSource;
use crate::records::{BatchDataset, HarvestResult};
use crate::state::{EntityState, EntityTracker, RetryState};
use crate::HarvestError;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Main batch coordinator structure
pub struct Coordinator {
    source: Arc<dyn TimelineSource>,
    settings: HarvestSettings,
    cancel: CancellationToken,
    dataset: BatchDataset,
}

impl Coordinator {
    /// Creates a coordinator with an empty dataset
    ///
    /// # Arguments
    ///
    /// * `source` - Where profiles and pages come from
    /// * `settings` - Limits, retry budget, and pacing
    /// * `cancel` - Token that stops the run at the next wait or request
    pub fn new(
        source: Arc<dyn TimelineSource>,
        settings: HarvestSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            settings,
            cancel,
            dataset: BatchDataset::new(),
        }
    }

    /// Records accumulated so far
    pub fn dataset(&self) -> &BatchDataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> BatchDataset {
        self.dataset
    }

    /// Processes every entity in list order
    ///
    /// Skips and per-entity failures are recorded in the report and never
    /// abort the batch. Cancellation ends the run early with
    /// `RunReport::interrupted` set; everything harvested before that point
    /// stays in the dataset.
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - The run finished or was interrupted
    /// * `Err(HarvestError::Precondition)` - The entity list is empty
    pub async fn run(&mut self, entities: &[String]) -> Result<RunReport, HarvestError> {
        if entities.is_empty() {
            return Err(HarvestError::Precondition(
                "entity list is empty".to_string(),
            ));
        }

        let total = entities.len();
        let mut report = RunReport::new(total);
        let start_time = Instant::now();
        tracing::info!("Starting harvest of {} entities", total);

        for (index, entity) in entities.iter().enumerate() {
            let mut tracker = EntityTracker::new(entity);
            let Some(outcome) = self.process_entity(entity, &mut tracker).await? else {
                report.interrupted = true;
                break;
            };
            report.record(outcome);

            tracing::info!(
                "Progress: {}/{} entities processed, {} records collected",
                index + 1,
                total,
                self.dataset.total_records()
            );

            if self.cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }
            if index + 1 == total {
                break;
            }

            tracker.advance(EntityState::InterEntityDelay)?;
            let delay = self.settings.entity_delay.sample();
            tracing::debug!("Waiting {:.1}s before next entity", delay.as_secs_f64());
            if pause(delay, &self.cancel).await.is_err() {
                report.interrupted = true;
                break;
            }
            tracker.advance(EntityState::Pending)?;
        }

        report.elapsed = start_time.elapsed();
        if report.interrupted {
            tracing::warn!(
                "Harvest interrupted: {}/{} entities processed, {} not reached",
                report.outcomes.len(),
                total,
                report.unprocessed()
            );
        } else {
            tracing::info!(
                "Harvest completed: {} succeeded, {} skipped, {} failed in {:?}",
                report.succeeded(),
                report.skipped(),
                report.failed(),
                report.elapsed
            );
        }

        Ok(report)
    }

    /// Harvests one entity, retrying rate-limited profile lookups
    ///
    /// Returns `None` if shutdown interrupted the entity before it produced
    /// an outcome.
    async fn process_entity(
        &mut self,
        entity: &str,
        tracker: &mut EntityTracker,
    ) -> Result<Option<EntityOutcome>, HarvestError> {
        let harvester = EntityHarvester::new(self.source.as_ref(), &self.settings, &self.cancel);
        let mut retry = RetryState::new(&self.settings.backoff, self.settings.max_retries);

        loop {
            tracker.advance(EntityState::Fetching)?;

            let error = match harvester.harvest(entity).await {
                Ok(result) => {
                    let state = if result.status.has_records() {
                        EntityState::Succeeded
                    } else {
                        EntityState::Skipped
                    };
                    tracker.advance(state)?;

                    let mut outcome = EntityOutcome::new(
                        entity,
                        state,
                        result.status.reason().map(str::to_string),
                    );
                    outcome.retries = retry.attempt();
                    outcome.records = record_count(&result);
                    self.dataset.append(result);
                    return Ok(Some(outcome));
                }
                Err(HarvestError::Interrupted) => return Ok(None),
                Err(e) => e,
            };

            if !error.is_rate_limit() {
                tracing::error!("Failed to harvest {}: {}", entity, error);
                tracker.advance(EntityState::Failed)?;
                let mut outcome =
                    EntityOutcome::new(entity, EntityState::Failed, Some(error.to_string()));
                outcome.retries = retry.attempt();
                return Ok(Some(outcome));
            }

            tracker.advance(EntityState::RetryBackoff)?;
            let wait = retry.record_rejection(&self.settings.backoff);
            tracing::warn!(
                "Rate limited looking up {} (attempt {}/{}), waiting {:.1}s",
                entity,
                retry.attempt(),
                self.settings.max_retries,
                wait.as_secs_f64()
            );
            if pause(wait, &self.cancel).await.is_err() {
                return Ok(None);
            }

            if retry.is_exhausted() {
                tracing::error!(
                    "Giving up on {} after {} rate-limited attempts",
                    entity,
                    retry.attempt()
                );
                tracker.advance(EntityState::Failed)?;
                let mut outcome = EntityOutcome::new(
                    entity,
                    EntityState::Failed,
                    Some("rate-limit retries exhausted".to_string()),
                );
                outcome.retries = retry.attempt();
                return Ok(Some(outcome));
            }
        }
    }
}

fn record_count(result: &HarvestResult) -> usize {
    usize::from(result.profile.is_some()) + result.primary.len() + result.secondary.len()
}
