//! The seam between harvesting logic and the remote API
//!
//! `TimelineSource` is implemented by the HTTP client for real runs and by
//! scripted sources in tests.

use crate::records::{Category, Page, RawProfile};
use async_trait::async_trait;
use thiserror::Error;

/// Classified failure of a single API request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The API refused the request for exceeding its quota
    #[error("rate limited")]
    RateLimited,

    /// The entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The entity exists but its data cannot be served
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The account is suspended or otherwise forbidden
    #[error("suspended: {0}")]
    Suspended(String),

    /// Network failure, timeout, or server error
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true for the only error class that triggers backoff
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Returns true if the entity itself cannot be harvested
    pub fn is_entity_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Unavailable(_) | Self::Suspended(_)
        )
    }
}

/// One pagination job: which entity, which category, how many items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    entity_id: String,
    category: Category,
    target_count: usize,
}

impl FetchTarget {
    pub fn new(entity_id: &str, category: Category, target_count: usize) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            category,
            target_count,
        }
    }

    /// Internal identifier of the entity the content belongs to
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Maximum number of items to collect
    pub fn target_count(&self) -> usize {
        self.target_count
    }
}

/// Remote source of profiles and paginated timeline content
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Looks up profile metadata by public handle
    async fn fetch_profile(&self, entity: &str) -> Result<RawProfile, ApiError>;

    /// Fetches one page of `category` content for an internal identifier
    ///
    /// `cursor` is `None` for the first page and the previous page's
    /// continuation token afterwards.
    async fn fetch_page(
        &self,
        entity_id: &str,
        category: Category,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<Page, ApiError>;
}
