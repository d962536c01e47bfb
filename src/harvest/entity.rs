//! Per-entity harvest: profile lookup followed by both content categories

use crate::harvest::paginator::{Pagination, Paginator, StopReason};
use crate::harvest::settings::HarvestSettings;
use crate::harvest::source::{FetchTarget, TimelineSource};
use crate::records::{
    Category, ContentRecord, HarvestResult, HarvestStatus, ProfileRecord, RawItem,
};
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Harvests one entity at a time
pub struct EntityHarvester<'a> {
    source: &'a dyn TimelineSource,
    settings: &'a HarvestSettings,
    cancel: &'a CancellationToken,
}

impl<'a> EntityHarvester<'a> {
    pub fn new(
        source: &'a dyn TimelineSource,
        settings: &'a HarvestSettings,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            source,
            settings,
            cancel,
        }
    }

    /// Resolves the profile, then collects primary and secondary content
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestResult)` - Success, partial failure, or a skip for an
    ///   entity that cannot be resolved
    /// * `Err(HarvestError::Api)` - The profile lookup was rate limited or
    ///   failed in transport; the caller decides whether to retry
    /// * `Err(HarvestError::Interrupted)` - Shutdown was requested before the
    ///   profile resolved
    pub async fn harvest(&self, entity: &str) -> Result<HarvestResult, HarvestError> {
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(HarvestError::Interrupted),
            response = self.source.fetch_profile(entity) => response,
        };

        let raw = match response {
            Ok(raw) => raw,
            Err(e) if e.is_entity_terminal() => {
                tracing::warn!("Skipping {}: {}", entity, e);
                return Ok(HarvestResult::skipped(entity, e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let Some(user_id) = raw.internal_id() else {
            tracing::warn!("Skipping {}: profile response has no identifier", entity);
            return Ok(HarvestResult::skipped(
                entity,
                "profile response has no identifier",
            ));
        };
        let profile = ProfileRecord::from_raw(&raw);

        let paginator = Paginator::new(self.source, self.settings, self.cancel);
        let primary = paginator
            .fetch(&FetchTarget::new(
                &user_id,
                Category::Primary,
                self.settings.primary_limit,
            ))
            .await;
        let secondary = if primary.stop == StopReason::Cancelled {
            Pagination::cancelled()
        } else {
            paginator
                .fetch(&FetchTarget::new(
                    &user_id,
                    Category::Secondary,
                    self.settings.secondary_limit,
                ))
                .await
        };

        let status = self.classify(&primary.stop, &secondary.stop);
        tracing::info!(
            "Harvested {}: {} {}, {} {} ({})",
            entity,
            primary.items.len(),
            Category::Primary,
            secondary.items.len(),
            Category::Secondary,
            status
        );

        Ok(HarvestResult {
            entity: entity.to_string(),
            status,
            profile: Some(profile),
            primary: normalize(&user_id, &primary.items),
            secondary: normalize(&user_id, &secondary.items),
            primary_stop: Some(primary.stop),
            secondary_stop: Some(secondary.stop),
        })
    }

    fn classify(&self, primary: &StopReason, secondary: &StopReason) -> HarvestStatus {
        let stops = [(Category::Primary, primary), (Category::Secondary, secondary)];

        if let Some((category, _)) = stops
            .iter()
            .find(|(_, stop)| **stop == StopReason::Cancelled)
        {
            return HarvestStatus::PartialFailure(format!("{} fetch interrupted", category));
        }

        if self.settings.flag_short_content {
            if let Some((category, stop)) = stops.iter().find(|(_, stop)| stop.is_shortfall()) {
                return HarvestStatus::PartialFailure(format!("{} fetch {}", category, stop));
            }
        }

        HarvestStatus::Success
    }
}

fn normalize(user_id: &str, items: &[RawItem]) -> Vec<ContentRecord> {
    items
        .iter()
        .map(|item| ContentRecord::from_raw(user_id, item))
        .collect()
}
