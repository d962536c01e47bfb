//! Harvest module: fetching, backoff, and batch orchestration
//!
//! This module contains the core harvesting logic, including:
//! - Exponential backoff with jitter for rate-limit rejections
//! - Cursor-driven pagination toward a target count
//! - Per-entity harvesting (profile plus two content categories)
//! - Batch coordination with pacing and graceful cancellation

mod backoff;
mod client;
mod coordinator;
mod entity;
mod pacing;
mod paginator;
mod report;
mod settings;
mod source;

#[cfg(test)]
mod testing;

pub use backoff::BackoffPolicy;
pub use client::{build_http_client, classify_status, ApiClient};
pub use coordinator::Coordinator;
pub use entity::EntityHarvester;
pub use pacing::{pause, DelayRange};
pub use paginator::{Pagination, Paginator, StopReason};
pub use report::{EntityOutcome, RunReport};
pub use settings::HarvestSettings;
pub use source::{ApiError, FetchTarget, TimelineSource};

use crate::records::BatchDataset;
use crate::HarvestError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete batch against `source`
///
/// This is the main entry point for a harvest. It will:
/// 1. Resolve each entity's profile, retrying rate-limited lookups
/// 2. Paginate primary and secondary content up to their limits
/// 3. Pause between entities
/// 4. Return the accumulated dataset with a per-entity report
///
/// # Example
///
/// ```no_run
/// use timeline_harvester::config::{load_config, load_entity_list};
/// use timeline_harvester::harvest::{run_batch, ApiClient, HarvestSettings};
/// use tokio_util::sync::CancellationToken;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvester.toml"))?;
/// let entities = load_entity_list(&config.input.entities_path)?;
/// let client = ApiClient::new(&config.api)?;
///
/// let (dataset, report) = run_batch(
///     Arc::new(client),
///     HarvestSettings::from_config(&config),
///     &entities,
///     CancellationToken::new(),
/// )
/// .await?;
/// println!("{} records from {} entities", dataset.total_records(), report.succeeded());
/// # Ok(())
/// # }
/// ```
pub async fn run_batch(
    source: Arc<dyn TimelineSource>,
    settings: HarvestSettings,
    entities: &[String],
    cancel: CancellationToken,
) -> Result<(BatchDataset, RunReport), HarvestError> {
    let mut coordinator = Coordinator::new(source, settings, cancel);
    let report = coordinator.run(entities).await?;
    Ok((coordinator.into_dataset(), report))
}
