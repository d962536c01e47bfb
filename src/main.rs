//! Timeline Harvester main entry point
//!
//! This is the command-line interface for the rate-limit aware timeline
//! harvester.

use anyhow::Context;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use timeline_harvester::config::{load_config_with_hash, load_entity_list, Config};
use timeline_harvester::harvest::{run_batch, ApiClient, HarvestSettings};
use timeline_harvester::output::{open_sinks, print_statistics, write_all, RunStatistics};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Timeline Harvester: collects profiles and timelines from a rate-limited API
///
/// Entities are processed one at a time. Rate-limit rejections are absorbed
/// with exponential backoff, and whatever was collected is exported even if
/// the run is interrupted with Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "timeline-harvester")]
#[command(version)]
#[command(about = "A rate-limit aware profile and timeline harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Entity list to harvest (overrides [input] entities-path)
    #[arg(short, long, value_name = "PATH")]
    entities: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write logs to this file (overrides [output] log-path)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Validate config and entity list and show the plan without harvesting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let log_path = cli.log_file.as_deref().or(config.output.log_path.as_deref());
    setup_logging(cli.verbose, cli.quiet, log_path)?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    let entities_path = cli
        .entities
        .clone()
        .unwrap_or_else(|| config.input.entities_path.clone());
    let entities = load_entity_list(&entities_path)?;
    tracing::info!(
        "Loaded {} entities from {}",
        entities.len(),
        entities_path.display()
    );

    if cli.dry_run {
        handle_dry_run(&config, &entities_path, &entities);
        return Ok(());
    }

    handle_harvest(config, &config_hash, entities).await
}

/// Sets up the tracing subscriber: console output plus an optional log file
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("timeline_harvester=info,warn"),
            1 => EnvFilter::new("timeline_harvester=debug,info"),
            2 => EnvFilter::new("timeline_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let file = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

/// Handles the --dry-run mode: validates inputs and shows what would be harvested
fn handle_dry_run(config: &Config, entities_path: &Path, entities: &[String]) {
    let settings = HarvestSettings::from_config(config);

    println!("=== Timeline Harvester Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Token variable: ${}", config.api.token_env);
    println!("  User agent: {}", config.api.user_agent);
    println!("  Request timeout: {}s", config.api.request_timeout);

    println!("\nHarvest:");
    println!("  Page size: {}", settings.page_size);
    println!("  Primary limit: {}", settings.primary_limit);
    println!("  Secondary limit: {}", settings.secondary_limit);
    println!("  Max retries: {}", settings.max_retries);
    println!(
        "  Backoff: {:.0}s initial, x{} growth, ±{:.0}s jitter, {:.0}s cap",
        settings.backoff.initial_wait.as_secs_f64(),
        settings.backoff.factor,
        settings.backoff.jitter.as_secs_f64(),
        settings.backoff.max_wait.as_secs_f64()
    );
    println!(
        "  Page delay: {:.1}-{:.1}s, entity delay: {:.1}-{:.1}s",
        settings.page_delay.min.as_secs_f64(),
        settings.page_delay.max.as_secs_f64(),
        settings.entity_delay.min.as_secs_f64(),
        settings.entity_delay.max.as_secs_f64()
    );

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path.display());
    if let Some(db) = &config.output.database_path {
        println!("  Database: {}", db.display());
    }

    println!(
        "\nEntities ({} from {}):",
        entities.len(),
        entities_path.display()
    );
    for entity in entities {
        println!("  - {}", entity);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} entities", entities.len());
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    config_hash: &str,
    entities: Vec<String>,
) -> anyhow::Result<()> {
    let mut sinks = open_sinks(&config.output, config_hash)?;
    let client = ApiClient::new(&config.api)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            trigger.cancel();
        }
    });

    let (dataset, report) = run_batch(
        Arc::new(client),
        HarvestSettings::from_config(&config),
        &entities,
        cancel,
    )
    .await?;

    write_all(&mut sinks, &dataset, &report)?;
    print_statistics(&RunStatistics::from_run(&report, &dataset));

    Ok(())
}
