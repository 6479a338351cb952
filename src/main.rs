//! Gleaner main entry point
//!
//! This is the command-line interface for the Gleaner site scraper.

use anyhow::Context;
use clap::Parser;
use gleaner::config::{load_or_default, validate, Config};
use gleaner::crawler::{Coordinator, ProgressUpdate};
use gleaner::output::print_report;
use gleaner::{export, normalize_url, ContentFlags, ExportFormat};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Gleaner: a depth-bounded site scraper
///
/// Gleaner crawls a site from a seed URL, follows links up to a maximum
/// depth with a bounded number of concurrent fetches, and exports the
/// extracted page content as TXT, CSV, JSON or PDF.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version)]
#[command(about = "A depth-bounded site scraper", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent fetches
    #[arg(short = 'c', long)]
    concurrency: Option<u32>,

    /// Maximum link depth from the seed (the seed is depth 0)
    #[arg(short = 'd', long)]
    depth: Option<u32>,

    /// Content to extract: comma-separated text,images,links,videos, or all/none
    #[arg(long, value_name = "FLAGS")]
    content: Option<ContentFlags>,

    /// Export format: txt, csv, json or pdf (unknown values fall back to txt)
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// File name of the export, without extension
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    file_name: Option<String>,

    /// Directory the export is written to
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.seed)
    } else {
        handle_crawl(config, &cli.seed).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
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

/// Loads the config file (if any), applies CLI overrides, then validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let mut config =
        load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency_limit = concurrency;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(content) = cli.content {
        config.content = content;
    }
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if let Some(file_name) = &cli.file_name {
        config.output.file_name = file_name.clone();
    }
    if let Some(dir) = &cli.out_dir {
        config.output.directory = dir.display().to_string();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, seed: &str) -> anyhow::Result<()> {
    let seed = normalize_url(seed).with_context(|| format!("Invalid seed URL: {}", seed))?;
    let format = ExportFormat::from_name(&config.output.format);

    println!("=== Gleaner Dry Run ===\n");

    println!("Seed: {}", seed);

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);
    println!(
        "  Attempts per URL: {} (backoff base {}ms)",
        config.crawler.max_attempts, config.crawler.backoff_base_ms
    );
    println!("  Max body size: {} bytes", config.crawler.max_body_bytes);
    println!("  Content: {}", config.content);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!(
        "  File: {}",
        Path::new(&config.output.directory)
            .join(format!("{}.{}", config.output.file_name, format.as_str()))
            .display()
    );

    if config.scope.allowed_domains.is_empty() {
        println!("\nScope: unrestricted");
    } else {
        println!(
            "\nAllowed Domains ({}):",
            config.scope.allowed_domains.len()
        );
        for domain in &config.scope.allowed_domains {
            println!("  - {}", domain);
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seed: &str) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            on_interrupt.cancel();
        }
    });

    let format = ExportFormat::from_name(&config.output.format);
    let directory = PathBuf::from(&config.output.directory);
    let file_name = config.output.file_name.clone();

    let mut coordinator =
        Coordinator::with_http(config).context("Failed to build HTTP client")?;

    let mut log_progress = |update: ProgressUpdate| {
        tracing::info!(
            "Progress: {}% ({} visited, {} queued, {} in flight)",
            update.percent,
            update.visited,
            update.queued,
            update.in_flight
        );
    };

    let outcome = coordinator
        .run(seed, cancel, &mut log_progress)
        .await
        .context("Crawl failed")?;

    print_report(&outcome.report);

    if outcome.report.cancelled && outcome.results.is_empty() {
        tracing::info!("Crawl cancelled before any page was recorded, nothing to export");
        return Ok(());
    }

    let exported = export(&outcome.results, format).context("Export failed")?;
    let path = exported
        .write_to(&directory, &file_name)
        .context("Failed to write export")?;

    println!(
        "\n✓ Exported {} pages to: {}",
        outcome.results.len(),
        path.display()
    );

    Ok(())
}
