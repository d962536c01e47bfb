use crate::config::{secs, Config};
use crate::harvest::backoff::BackoffPolicy;
use crate::harvest::pacing::DelayRange;

/// Runtime knobs shared by the paginator, entity harvester, and coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestSettings {
    /// Consecutive rate-limit rejections tolerated per operation
    pub max_retries: u32,

    /// Items requested per page (before clamping to the remaining count)
    pub page_size: usize,

    /// Primary content items to collect per entity
    pub primary_limit: usize,

    /// Secondary content items to collect per entity
    pub secondary_limit: usize,

    /// Report content cut short by retry exhaustion as a partial failure
    pub flag_short_content: bool,

    pub backoff: BackoffPolicy,
    pub page_delay: DelayRange,
    pub entity_delay: DelayRange,
}

impl HarvestSettings {
    pub fn from_config(config: &Config) -> Self {
        let harvest = &config.harvest;
        let pacing = &config.pacing;

        Self {
            max_retries: harvest.max_retries,
            page_size: harvest.page_size,
            primary_limit: harvest.primary_limit,
            secondary_limit: harvest.secondary_limit,
            flag_short_content: harvest.flag_short_content,
            backoff: BackoffPolicy::from_config(&config.backoff),
            page_delay: DelayRange::new(secs(pacing.page_delay_min), secs(pacing.page_delay_max)),
            entity_delay: DelayRange::new(
                secs(pacing.entity_delay_min),
                secs(pacing.entity_delay_max),
            ),
        }
    }
}
