//! Scripted `TimelineSource` for unit tests
//!
//! Responses are queued per profile handle and per (identifier, category).
//! Each call pops the next response; the final one repeats forever.

use crate::harvest::backoff::BackoffPolicy;
use crate::harvest::pacing::DelayRange;
use crate::harvest::settings::HarvestSettings;
use crate::harvest::source::{ApiError, TimelineSource};
use crate::records::{Category, Page, RawItem, RawProfile};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type Script<T> = VecDeque<Result<T, ApiError>>;

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub entity_id: String,
    pub category: Category,
    pub page_size: usize,
    pub cursor: Option<String>,
}

#[derive(Default)]
pub struct ScriptedSource {
    profiles: Mutex<HashMap<String, Script<RawProfile>>>,
    pages: Mutex<HashMap<(String, Category), Script<Page>>>,
    profile_requests: Mutex<Vec<String>>,
    page_requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, entity: &str, response: Result<RawProfile, ApiError>) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .entry(entity.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn with_page(
        self,
        entity_id: &str,
        category: Category,
        response: Result<Page, ApiError>,
    ) -> Self {
        self.pages
            .lock()
            .unwrap()
            .entry((entity_id.to_string(), category))
            .or_default()
            .push_back(response);
        self
    }

    /// Registers a resolvable entity with one page of each content category
    pub fn with_entity(self, entity: &str, id: &str, primary: &[&str], secondary: &[&str]) -> Self {
        self.with_profile(entity, Ok(profile(id, entity)))
            .with_page(id, Category::Primary, Ok(Page::new(items(primary), None)))
            .with_page(id, Category::Secondary, Ok(Page::new(items(secondary), None)))
    }

    pub fn profile_requests(&self) -> Vec<String> {
        self.profile_requests.lock().unwrap().clone()
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().unwrap().clone()
    }

    fn next<T: Clone>(script: &mut Script<T>) -> Option<Result<T, ApiError>> {
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl TimelineSource for ScriptedSource {
    async fn fetch_profile(&self, entity: &str) -> Result<RawProfile, ApiError> {
        self.profile_requests
            .lock()
            .unwrap()
            .push(entity.to_string());

        let mut profiles = self.profiles.lock().unwrap();
        profiles
            .get_mut(entity)
            .and_then(Self::next)
            .unwrap_or_else(|| Err(ApiError::NotFound(entity.to_string())))
    }

    async fn fetch_page(
        &self,
        entity_id: &str,
        category: Category,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<Page, ApiError> {
        self.page_requests.lock().unwrap().push(PageRequest {
            entity_id: entity_id.to_string(),
            category,
            page_size,
            cursor: cursor.map(str::to_string),
        });

        let mut pages = self.pages.lock().unwrap();
        pages
            .get_mut(&(entity_id.to_string(), category))
            .and_then(Self::next)
            .unwrap_or_else(|| Ok(Page::default()))
    }
}

pub fn profile(id: &str, screen_name: &str) -> RawProfile {
    RawProfile {
        id: Some(json!(id)),
        screen_name: Some(json!(screen_name)),
        name: Some(json!(screen_name.to_uppercase())),
        followers_count: Some(json!(10)),
        ..Default::default()
    }
}

pub fn items(ids: &[&str]) -> Vec<RawItem> {
    ids.iter()
        .map(|id| RawItem {
            id: Some(json!(id)),
            full_text: Some(json!(format!("post {}", id))),
            ..Default::default()
        })
        .collect()
}

/// Settings with no politeness delays and short, deterministic backoff
pub fn fast_settings() -> HarvestSettings {
    HarvestSettings {
        max_retries: 3,
        page_size: 200,
        primary_limit: 5,
        secondary_limit: 5,
        flag_short_content: false,
        backoff: BackoffPolicy {
            initial_wait: Duration::from_secs(1),
            factor: 2.5,
            jitter: Duration::ZERO,
            floor: Duration::ZERO,
            max_wait: Duration::from_secs(3600),
        },
        page_delay: DelayRange::none(),
        entity_delay: DelayRange::none(),
    }
}
