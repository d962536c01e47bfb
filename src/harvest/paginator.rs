//! Cursor-driven pagination with rate-limit backoff
//!
//! # Loop
//!
//! 1. Request `min(page_size, remaining)` items at the current cursor
//! 2. On a rate-limit rejection, back off and retry the same cursor; once
//!    the budget is spent, stop after that final wait
//! 3. On any other error, stop with what has been collected
//! 4. On success, append items; stop if the page was empty, the cursor is
//!    absent, or the target is reached
//! 5. Otherwise reset the retry state, pause politely, and advance the cursor
//!
//! Collected items are never discarded: every stop returns the accumulated
//! items truncated to the target count.

use crate::harvest::pacing::pause;
use crate::harvest::settings::HarvestSettings;
use crate::harvest::source::{ApiError, FetchTarget, TimelineSource};
use crate::records::RawItem;
use crate::state::RetryState;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Why a pagination run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The target count was collected
    TargetReached,

    /// The source ran out of content
    EndOfStream,

    /// Consecutive rate-limit rejections used up the retry budget
    RetriesExhausted,

    /// A non-retryable error ended pagination
    Rejected(ApiError),

    /// Shutdown was requested
    Cancelled,

    /// The category is not fetched page by page
    NotPaginated,
}

impl StopReason {
    /// Returns true if pagination stopped before the source was drained
    /// for reasons other than reaching the target
    pub fn is_shortfall(&self) -> bool {
        matches!(self, Self::RetriesExhausted | Self::Rejected(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetReached => write!(f, "target reached"),
            Self::EndOfStream => write!(f, "end of stream"),
            Self::RetriesExhausted => write!(f, "rate-limit retries exhausted"),
            Self::Rejected(e) => write!(f, "rejected: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
            Self::NotPaginated => write!(f, "not paginated"),
        }
    }
}

/// Items collected by one pagination run
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub items: Vec<RawItem>,
    pub stop: StopReason,

    /// Requests actually sent, including rejected ones
    pub requests: u32,
}

impl Pagination {
    /// A run that never started because shutdown was already requested
    pub fn cancelled() -> Self {
        Self {
            items: Vec::new(),
            stop: StopReason::Cancelled,
            requests: 0,
        }
    }
}

/// Drives one `FetchTarget` to completion against a `TimelineSource`
pub struct Paginator<'a> {
    source: &'a dyn TimelineSource,
    settings: &'a HarvestSettings,
    cancel: &'a CancellationToken,
}

impl<'a> Paginator<'a> {
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

    /// Collects up to `target.target_count()` items
    ///
    /// Never fails: errors end pagination and are reported through
    /// `Pagination::stop` alongside whatever was collected before them.
    pub async fn fetch(&self, target: &FetchTarget) -> Pagination {
        let category = target.category();
        if !category.is_paginated() {
            tracing::warn!("Refusing to paginate {} for {}", category, target.entity_id());
            return Pagination {
                items: Vec::new(),
                stop: StopReason::NotPaginated,
                requests: 0,
            };
        }

        let limit = target.target_count();
        let mut items: Vec<RawItem> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut retry = RetryState::new(&self.settings.backoff, self.settings.max_retries);
        let mut requests = 0u32;

        let stop = loop {
            if items.len() >= limit {
                break StopReason::TargetReached;
            }

            let page_size = self.settings.page_size.min(limit - items.len());
            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                response = self.source.fetch_page(
                    target.entity_id(),
                    category,
                    page_size,
                    cursor.as_deref(),
                ) => Some(response),
            };
            let Some(response) = response else {
                break StopReason::Cancelled;
            };
            requests += 1;

            let page = match response {
                Ok(page) => page,
                Err(ApiError::RateLimited) => {
                    let wait = retry.record_rejection(&self.settings.backoff);
                    tracing::warn!(
                        "Rate limited fetching {} for {} (attempt {}/{}), waiting {:.1}s",
                        category,
                        target.entity_id(),
                        retry.attempt(),
                        self.settings.max_retries,
                        wait.as_secs_f64()
                    );
                    if pause(wait, self.cancel).await.is_err() {
                        break StopReason::Cancelled;
                    }

                    if retry.is_exhausted() {
                        tracing::warn!(
                            "Giving up on {} for {} after {} attempts ({} items collected)",
                            category,
                            target.entity_id(),
                            retry.attempt(),
                            items.len()
                        );
                        break StopReason::RetriesExhausted;
                    }
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        "Stopping {} for {} after error: {}",
                        category,
                        target.entity_id(),
                        e
                    );
                    break StopReason::Rejected(e);
                }
            };

            let last = page.is_last();
            let next = page.cursor().map(str::to_string);
            let received = page.items.len();
            items.extend(page.items);

            tracing::debug!(
                "Fetched {} {} items for {} ({}/{})",
                received,
                category,
                target.entity_id(),
                items.len().min(limit),
                limit
            );

            if last {
                break StopReason::EndOfStream;
            }
            if items.len() >= limit {
                break StopReason::TargetReached;
            }

            retry.reset();
            cursor = next;
            if pause(self.settings.page_delay.sample(), self.cancel)
                .await
                .is_err()
            {
                break StopReason::Cancelled;
            }
        };

        items.truncate(limit);
        Pagination {
            items,
            stop,
            requests,
        }
    }
}
