//! Record model for harvested data
//!
//! This module defines:
//! - `FieldValue`: the scalar value every record field holds
//! - Raw API payloads (`RawProfile`, `RawItem`, `Page`)
//! - Fixed-schema normalized records (`ProfileRecord`, `ContentRecord`)
//! - Per-entity results and the run-wide `BatchDataset`

mod dataset;
mod raw;
mod schema;
mod value;

pub use dataset::{BatchDataset, HarvestResult, HarvestStatus};
pub use raw::{Page, RawItem, RawProfile};
pub use schema::{ContentRecord, ProfileRecord, Record};
pub use value::{FieldValue, NOT_AVAILABLE};

use std::fmt;

/// The kind of resource a fetch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Profile metadata, fetched with a single request
    Profile,

    /// Primary timeline content
    Primary,

    /// Secondary (highlighted) timeline content
    Secondary,
}

impl Category {
    /// Returns true if this category is fetched page by page
    pub fn is_paginated(&self) -> bool {
        !matches!(self, Self::Profile)
    }

    /// Short label used in logs and API paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Primary => "tweets",
            Self::Secondary => "highlights",
        }
    }

    /// Name of the dataset collection holding this category's records
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Profile => "users",
            Self::Primary => "tweets",
            Self::Secondary => "highlight_tweets",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
