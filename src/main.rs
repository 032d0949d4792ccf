//! kb-archiver main entry point
//!
//! This is the command-line interface for the knowledge-base archiver.

use clap::{Parser, Subcommand};
use kb_archiver::catalog::fetch_catalog;
use kb_archiver::config::{load_config_with_hash, Config};
use kb_archiver::crawler::{build_http_client, crawl_catalog};
use kb_archiver::extract::extract_archive;
use kb_archiver::output::{generate_markdown_report, print_extract_report, print_report};
use kb_archiver::KbError;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// kb-archiver: knowledge-base fetch-and-archive pipeline
///
/// Lists the articles of a knowledge base, archives their HTML into a
/// content store (skipping what is already there), and extracts the
/// article text from the archive.
#[derive(Parser, Debug)]
#[command(name = "kb-archiver")]
#[command(version = "1.0.0")]
#[command(about = "Archive and extract knowledge-base articles", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the catalog and archive every document not yet stored
    Crawl,

    /// Extract article text from every archived page
    Extract,

    /// Print the catalog listing and exit
    List,

    /// Validate the configuration and show what would run
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(KbError::from(e).into());
        }
    };

    match cli.command {
        Command::Crawl => handle_crawl(&config).await?,
        Command::Extract => handle_extract(&config)?,
        Command::List => handle_list(&config).await?,
        Command::Check => handle_check(&config),
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kb_archiver=info,warn"),
            1 => EnvFilter::new("kb_archiver=debug,info"),
            2 => EnvFilter::new("kb_archiver=trace,debug"),
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

/// Handles `crawl`: the bronze stage
async fn handle_crawl(config: &Config) -> kb_archiver::Result<()> {
    let report = match crawl_catalog(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl could not start: {}", e);
            return Err(e);
        }
    };

    print_report(&report);

    if let Some(path) = &config.output.report_path {
        generate_markdown_report(&report, Path::new(path))?;
        println!("\n✓ Report written to: {}", path);
    }

    if report.failed_count() > 0 {
        tracing::warn!(
            "{} records could not be archived; rerun to retry them",
            report.failed_count()
        );
    }

    Ok(())
}

/// Handles `extract`: the silver stage
fn handle_extract(config: &Config) -> kb_archiver::Result<()> {
    let report = extract_archive(config)?;
    print_extract_report(&report);
    Ok(())
}

/// Handles `list`: prints the catalog
async fn handle_list(config: &Config) -> kb_archiver::Result<()> {
    let client = build_http_client(&config.user_agent.value)?;
    let entries = fetch_catalog(&client, &config.catalog.index_url).await?;

    println!("Total documents found: {}\n", entries.len());
    for entry in &entries {
        println!(
            "[{} / {}] {}\n    {}",
            entry.main_category, entry.sub_category, entry.title, entry.url
        );
    }

    Ok(())
}

/// Handles `check`: shows the resolved configuration
fn handle_check(config: &Config) {
    println!("=== kb-archiver Configuration Check ===\n");

    println!("Crawler:");
    if config.crawler.max_downloads > 0 {
        println!("  Download limit: {}", config.crawler.max_downloads);
    } else {
        println!("  Download limit: unlimited");
    }
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Attempts per document: {}", config.crawler.max_attempts);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nCatalog:");
    println!("  Index URL: {}", config.catalog.index_url);

    println!("\nStore:");
    println!("  Backend: {}", config.store.backend.as_str());
    println!("  Location: {}", config.store.location);

    if let Some(path) = &config.output.report_path {
        println!("\nOutput:");
        println!("  Report: {}", path);
    }

    println!("\n✓ Configuration is valid");
}
