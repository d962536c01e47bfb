use crate::config::types::{
    ApiConfig, BackoffConfig, Config, HarvestConfig, OutputConfig, PacingConfig,
};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_harvest_config(&config.harvest)?;
    validate_backoff_config(&config.backoff)?;
    validate_pacing_config(&config.pacing)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API connection settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' cannot be used as a base",
            config.base_url
        )));
    }

    if config.token_env.is_empty() {
        return Err(ConfigError::Validation(
            "token_env cannot be empty".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    validate_seconds("request_timeout", config.request_timeout)?;
    if config.request_timeout == 0.0 {
        return Err(ConfigError::Validation(
            "request_timeout must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates harvest volume settings
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates backoff settings
fn validate_backoff_config(config: &BackoffConfig) -> Result<(), ConfigError> {
    validate_seconds("initial_wait", config.initial_wait)?;
    validate_seconds("jitter", config.jitter)?;
    validate_seconds("floor", config.floor)?;
    validate_seconds("max_wait", config.max_wait)?;

    if !config.factor.is_finite() || config.factor < 1.0 {
        return Err(ConfigError::Validation(format!(
            "factor must be a finite number >= 1.0, got {}",
            config.factor
        )));
    }

    if config.floor > config.max_wait {
        return Err(ConfigError::Validation(format!(
            "floor ({}s) cannot exceed max_wait ({}s)",
            config.floor, config.max_wait
        )));
    }

    if config.initial_wait > config.max_wait {
        return Err(ConfigError::Validation(format!(
            "initial_wait ({}s) cannot exceed max_wait ({}s)",
            config.initial_wait, config.max_wait
        )));
    }

    Ok(())
}

/// Validates politeness delay ranges
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_range("page_delay", config.page_delay_min, config.page_delay_max)?;
    validate_range(
        "entity_delay",
        config.entity_delay_min,
        config.entity_delay_max,
    )?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "json_path cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.database_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks that a duration in seconds is finite, non-negative and representable
fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }

    if Duration::try_from_secs_f64(value).is_err() {
        return Err(ConfigError::Validation(format!(
            "{} is too large to be a duration, got {}s",
            name, value
        )));
    }

    Ok(())
}

/// Checks a min/max delay pair
fn validate_range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    validate_seconds(&format!("{}_min", name), min)?;
    validate_seconds(&format!("{}_max", name), max)?;

    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}_min ({}s) cannot exceed {}_max ({}s)",
            name, min, name, max
        )));
    }

    Ok(())
}
