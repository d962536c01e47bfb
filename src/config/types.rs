use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote API connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL all endpoints are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Name of the environment variable holding the bearer token
    #[serde(rename = "token-env", default = "default_token_env")]
    pub token_env: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: f64,
}

impl ApiConfig {
    /// Creates a connection config for `base_url` with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_token_env() -> String {
    "HARVEST_API_TOKEN".to_string()
}

fn default_user_agent() -> String {
    format!("timeline-harvester/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> f64 {
    30.0
}

/// Harvest volume and retry budget configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Maximum consecutive rate-limit rejections tolerated per operation
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Largest page requested from the API
    #[serde(rename = "page-size")]
    pub page_size: usize,

    /// Target number of primary timeline items per entity
    #[serde(rename = "primary-limit")]
    pub primary_limit: usize,

    /// Target number of secondary (highlight) items per entity
    #[serde(rename = "secondary-limit")]
    pub secondary_limit: usize,

    /// Report content cut short by retries or rejections as a partial failure
    #[serde(rename = "flag-short-content")]
    pub flag_short_content: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            page_size: 200,
            primary_limit: 200,
            secondary_limit: 200,
            flag_short_content: false,
        }
    }
}

/// Exponential backoff configuration (all durations in seconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Wait before the first retry
    #[serde(rename = "initial-wait")]
    pub initial_wait: f64,

    /// Growth factor applied to the previous wait
    pub factor: f64,

    /// Half-width of the symmetric random jitter
    pub jitter: f64,

    /// Lower bound for any computed wait
    pub floor: f64,

    /// Upper bound for any single backoff sleep
    #[serde(rename = "max-wait")]
    pub max_wait: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_wait: 60.0,
            factor: 2.5,
            jitter: 5.0,
            floor: 0.0,
            max_wait: 3600.0,
        }
    }
}

/// Politeness delays (seconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    #[serde(rename = "page-delay-min")]
    pub page_delay_min: f64,

    #[serde(rename = "page-delay-max")]
    pub page_delay_max: f64,

    #[serde(rename = "entity-delay-min")]
    pub entity_delay_min: f64,

    #[serde(rename = "entity-delay-max")]
    pub entity_delay_max: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay_min: 1.0,
            page_delay_max: 3.0,
            entity_delay_min: 15.0,
            entity_delay_max: 30.0,
        }
    }
}

/// Entity list location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File with one entity reference per line
    #[serde(rename = "entities-path")]
    pub entities_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            entities_path: PathBuf::from("usernames.txt"),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON document holding all harvested records
    #[serde(rename = "json-path")]
    pub json_path: PathBuf,

    /// Optional SQLite database receiving the same records
    #[serde(rename = "database-path")]
    pub database_path: Option<PathBuf>,

    /// Optional plain-text log file
    #[serde(rename = "log-path")]
    pub log_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from("harvest.json"),
            database_path: None,
            log_path: None,
        }
    }
}

/// Converts a configured number of seconds into a `Duration`
///
/// Negative and NaN values become zero, values too large for a `Duration`
/// saturate to `Duration::MAX`. Validation rejects both for configs loaded
/// from disk.
pub fn secs(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
