//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus loading the entity list the run iterates over.
//!
//! # Example
//!
//! ```no_run
//! use timeline_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Page size: {}", config.harvest.page_size);
//! ```

mod entities;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    secs, ApiConfig, BackoffConfig, Config, HarvestConfig, InputConfig, OutputConfig,
    PacingConfig,
};

// Re-export parser functions
pub use entities::{load_entity_list, parse_entity_list};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
