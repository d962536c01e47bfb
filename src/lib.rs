//! Timeline Harvester: a rate-limit aware profile and timeline collector
//!
//! This crate harvests profile metadata and two categories of timeline content
//! for a list of named entities from a cursor-paginated API, backing off
//! adaptively when the API rejects requests for exceeding its quota.

pub mod config;
pub mod harvest;
pub mod output;
pub mod records;
pub mod state;

use thiserror::Error;

pub use harvest::ApiError;
pub use output::OutputError;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Invalid state transition for {entity}: {from:?} -> {to:?}")]
    InvalidTransition {
        entity: String,
        from: state::EntityState,
        to: state::EntityState,
    },

    #[error("Harvest interrupted by shutdown request")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if this error is a rate-limit rejection worth retrying
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_rate_limit())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{ApiClient, Coordinator, RunReport, TimelineSource};
pub use records::{BatchDataset, Category, HarvestResult, HarvestStatus};
pub use state::{EntityState, RetryState};
