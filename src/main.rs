//! crawl-frontier command-line entry point
//!
//! Runs one crawl from a start URL using the filters, scorer, and limits of a
//! TOML configuration file, printing each fetched page as it completes.

use anyhow::Context;
use clap::Parser;
use crawl_frontier::config::{load_config_with_hash, Config};
use crawl_frontier::crawler::{crawl, CrawlState, HttpFetcher};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// crawl-frontier: a prioritized, polite deep crawler
///
/// Starting from one URL, follows links breadth-first within the configured
/// depth and page limits, admitting links through robots.txt and the filter
/// chain and fetching the most relevant ones first.
#[derive(Parser, Debug)]
#[command(name = "crawl-frontier")]
#[command(version = "1.0.0")]
#[command(about = "A prioritized, polite deep crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URL the crawl starts from (depth 0)
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the filters and scorer without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config, &cli.start_url);
    }

    handle_crawl(&config, &cli.start_url).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_frontier=info,warn"),
            1 => EnvFilter::new("crawl_frontier=debug,info"),
            2 => EnvFilter::new("crawl_frontier=trace,debug"),
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

/// Handles --dry-run: prints what the crawl would run with
fn handle_dry_run(config: &Config, start_url: &str) -> anyhow::Result<()> {
    let start = crawl_frontier::normalize_url(start_url).context("Invalid start URL")?;

    println!("=== crawl-frontier Dry Run ===\n");
    println!("Start URL: {}", start);

    println!("\nCrawl:");
    println!("  Max depth: {}", config.crawl.max_depth);
    match config.crawl.max_pages {
        0 => println!("  Max pages: unbounded"),
        n => println!("  Max pages: {}", n),
    }
    println!("  Batch size: {}", config.crawl.batch_size);
    println!("  Follow external links: {}", config.crawl.follow_external_links);
    println!("  Respect robots.txt: {}", config.crawl.respect_robots);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    let chain = config.build_filter_chain()?;
    println!("\nFilters ({}):", chain.len());
    for (i, filter) in chain.filters().iter().enumerate() {
        println!("  {}. {}", i + 1, filter.name());
    }

    match config.build_scorer()? {
        Some(scorer) => {
            println!(
                "\nScorer ({} components, normalize = {}):",
                scorer.scorers().len(),
                scorer.is_normalized()
            );
            for component in scorer.scorers() {
                println!("  - {} (weight {})", component.name(), component.weight());
            }
            println!("  Start URL score: {:.3}", scorer.score(start.as_str()));
        }
        None => println!("\nScorer: none (FIFO by depth)"),
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Runs the crawl, printing one line per fetched page
async fn handle_crawl(config: &Config, start_url: &str) -> anyhow::Result<()> {
    let crawl_config = config.crawl_config()?;
    let filter_chain = crawl_config.filter_chain.clone();
    let fetcher = Arc::new(HttpFetcher::from_user_agent(&config.user_agent)?);

    let mut handle = crawl(start_url, crawl_config, fetcher).context("Invalid start URL")?;

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current batch");
            cancel.cancel();
        }
    });

    while let Some(item) = handle.next().await {
        let result = item.context("Crawl aborted")?;
        let page = &result.page;
        if page.success {
            println!(
                "[{}] depth={} score={:.3} links={} {}",
                page.status_code,
                result.depth,
                result.score,
                page.internal_links.len() + page.external_links.len(),
                page.url
            );
        } else {
            println!(
                "[ERR] depth={} {} ({})",
                result.depth,
                page.url,
                page.error_message.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let stats = handle.stats();
    println!("\n=== Crawl {} ===", handle.state());
    println!("Processed: {}", stats.urls_processed);
    println!("Failed: {}", stats.urls_failed);
    println!("Skipped: {} ({} by robots.txt)", stats.urls_skipped, stats.robots_blocked);
    println!("Max depth reached: {}", stats.max_depth_reached);
    println!("Elapsed: {:.1}s", stats.elapsed_secs());

    for (name, filter_stats) in filter_chain.filter_stats() {
        println!(
            "Filter {}: seen={} passed={} rejected={}",
            name, filter_stats.total_seen, filter_stats.passed, filter_stats.rejected
        );
    }

    if handle.state() == CrawlState::Cancelled {
        tracing::warn!("Crawl did not run to completion");
    }

    Ok(())
}
