use crate::harvest::StopReason;
use crate::records::schema::{ContentRecord, ProfileRecord};
use serde::Serialize;
use std::fmt;

/// Outcome classification for one harvested entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestStatus {
    /// Profile resolved; content may legitimately be shorter than requested
    Success,

    /// Profile resolved but content collection was cut short
    PartialFailure(String),

    /// Profile could not be resolved; no content was requested
    Skipped(String),
}

impl HarvestStatus {
    /// Returns true for a clean success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if the result carries records worth keeping
    pub fn has_records(&self) -> bool {
        matches!(self, Self::Success | Self::PartialFailure(_))
    }

    /// Returns the reason attached to a non-success status
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::PartialFailure(reason) | Self::Skipped(reason) => Some(reason),
        }
    }
}

impl fmt::Display for HarvestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::PartialFailure(reason) => write!(f, "partial failure ({})", reason),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}

/// Everything harvested for one entity
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestResult {
    pub entity: String,
    pub status: HarvestStatus,
    pub profile: Option<ProfileRecord>,
    pub primary: Vec<ContentRecord>,
    pub secondary: Vec<ContentRecord>,

    /// Why primary pagination ended, if it ran
    pub primary_stop: Option<StopReason>,

    /// Why secondary pagination ended, if it ran
    pub secondary_stop: Option<StopReason>,
}

impl HarvestResult {
    /// Creates a result for an entity whose profile could not be resolved
    pub fn skipped(entity: &str, reason: impl Into<String>) -> Self {
        Self {
            entity: entity.to_string(),
            status: HarvestStatus::Skipped(reason.into()),
            profile: None,
            primary: Vec::new(),
            secondary: Vec::new(),
            primary_stop: None,
            secondary_stop: None,
        }
    }
}

/// Accumulated records for a whole run
///
/// Collections only grow, in entity processing order. Serializes to
/// `{"users": [...], "tweets": [...], "highlight_tweets": [...]}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDataset {
    users: Vec<ProfileRecord>,
    #[serde(rename = "tweets")]
    primary: Vec<ContentRecord>,
    #[serde(rename = "highlight_tweets")]
    secondary: Vec<ContentRecord>,
}

impl BatchDataset {
    /// Creates an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the records of one harvested entity
    ///
    /// Skipped results carry nothing and are ignored. Returns true if the
    /// result was appended.
    pub fn append(&mut self, result: HarvestResult) -> bool {
        if !result.status.has_records() {
            return false;
        }

        if let Some(profile) = result.profile {
            self.users.push(profile);
        }
        self.primary.extend(result.primary);
        self.secondary.extend(result.secondary);
        true
    }

    pub fn users(&self) -> &[ProfileRecord] {
        &self.users
    }

    pub fn primary(&self) -> &[ContentRecord] {
        &self.primary
    }

    pub fn secondary(&self) -> &[ContentRecord] {
        &self.secondary
    }

    /// Total number of records across all collections
    pub fn total_records(&self) -> usize {
        self.users.len() + self.primary.len() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}
