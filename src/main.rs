//! Sitemap-Harvest main entry point
//!
//! This is the command-line interface for the Sitemap-Harvest archive harvester.

use anyhow::Context;
use clap::Parser;
use sitemap_harvest::config::{load_config_with_hash, Config};
use sitemap_harvest::output::{print_summary, write_outputs};
use sitemap_harvest::{CrawlFilter, TraversalEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sitemap-Harvest: a filterable news-archive harvester
///
/// Walks a year → topic/month → article sitemap, extracts one record per
/// article and writes the records and every per-page failure to disk.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A filterable news-archive harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let filter = CrawlFilter::from_config(&config.filter);

    if cli.dry_run {
        handle_dry_run(&config, &filter);
        return Ok(ExitCode::SUCCESS);
    }

    handle_harvest(&config, &config_hash, &filter).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvest=info,warn"),
            1 => EnvFilter::new("sitemap_harvest=debug,info"),
            2 => EnvFilter::new("sitemap_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, filter: &CrawlFilter) {
    println!("=== Sitemap-Harvest Dry Run ===\n");

    println!("Archive:");
    println!("  Base URL: {}", config.archive.base_url);
    println!("  Top index: {}", config.archive.top_index_url);
    println!("  Publisher: {} (bias {})", config.archive.publisher, config.archive.bias);

    println!("\nFilter:");
    for (dimension, value) in filter.describe() {
        println!("  {}: {}", dimension, value);
    }

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.effective_concurrency());
    println!(
        "  Timeouts: {}s total, {}s connect",
        config.crawler.timeout_secs, config.crawler.connect_timeout_secs
    );
    println!("  Max redirects: {}", config.crawler.max_redirects);
    println!(
        "  Body length: {}..={} characters",
        config.crawler.min_body_chars, config.crawler.max_body_chars
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File prefix: {}", config.output.file_prefix);
    println!("  Drop empty: {}", config.output.drop_empty);
    if let Some(db) = &config.output.database_path {
        println!("  Database: {}", db);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    config_hash: &str,
    filter: &CrawlFilter,
) -> anyhow::Result<ExitCode> {
    let engine = TraversalEngine::new(config).context("Failed to initialize harvester")?;
    let report = engine.run(filter).await;

    let (paths, summary) = write_outputs(&report, config, config_hash, &filter.years_label())
        .context("Failed to write harvest output")?;

    print_summary(&summary);
    println!("\nRecords: {}", paths.records.display());
    println!("Errors:  {}", paths.errors.display());

    if report.aborted {
        tracing::error!("Harvest aborted; see {}", paths.errors.display());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
