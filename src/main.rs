//! Site-Sift main entry point
//!
//! This is the command-line interface for the Site-Sift crawler and search
//! engine.

use clap::{Parser, Subcommand};
use site_sift::config::{load_config_with_hash, Config};
use site_sift::crawler::Coordinator;
use site_sift::index::SearchEngine;
use site_sift::output::{load_statistics, print_crawl_report, print_ranking, print_statistics};
use site_sift::storage::{open_storage, SqliteStorage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Site-Sift: a bounded site crawler with a TF-IDF search engine
///
/// Site-Sift crawls one site subtree until it finds the configured target
/// page, stores the person records listed there, and ranks a document
/// corpus against free-text queries.
#[derive(Parser, Debug)]
#[command(name = "site-sift")]
#[command(version)]
#[command(about = "A bounded site crawler and TF-IDF search engine", long_about = None)]
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
    /// Crawl the configured site until the target page is found
    Crawl {
        /// Remove previously fetched pages before crawling
        #[arg(long)]
        fresh: bool,

        /// Validate config and show what would be crawled without crawling
        #[arg(long)]
        dry_run: bool,
    },

    /// Show statistics from the database and exit
    Stats,

    /// Add a document to the corpus
    Add {
        /// Document text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Rank the corpus against a query
    Search {
        /// Query text
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Crawl { dry_run: true, .. } => handle_dry_run(&config),
        Command::Crawl { fresh, .. } => handle_crawl(config, &config_hash, fresh).await,
        Command::Stats => handle_stats(&config),
        Command::Add { text } => handle_add(&config, &text.join(" ")),
        Command::Search { query } => handle_search(&config, &query.join(" ")),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_sift=info,warn"),
            1 => EnvFilter::new("site_sift=debug,info"),
            2 => EnvFilter::new("site_sift=trace,debug"),
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

/// Opens the configured database; failing here ends the process
fn open_database(config: &Config) -> Result<Arc<Mutex<SqliteStorage>>, Box<dyn std::error::Error>> {
    let path = Path::new(&config.output.database_path);
    match open_storage(path) {
        Ok(storage) => Ok(Arc::new(Mutex::new(storage))),
        Err(e) => {
            tracing::error!("Failed to open database {}: {}", path.display(), e);
            Err(e.into())
        }
    }
}

/// Handles `crawl --dry-run`: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Site-Sift Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Scope: {}", config.crawler.scope);
    println!("  Extensions: {}", config.crawler.extensions.join(", "));
    println!("  Workers: {}", config.crawler.workers);
    match config.crawler.max_pages {
        Some(limit) => println!("  Max pages: {}", limit),
        None => println!("  Max pages: unbounded"),
    }
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nTarget:");
    println!(
        "  Heading: {} = \"{}\"",
        config.target.heading_selector, config.target.heading_text
    );
    println!(
        "  Records: {} > {} + {} (leader <{}>)",
        config.target.record_container,
        config.target.record_heading,
        config.target.record_block,
        config.target.field_leader
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.crawler.seeds.len()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: &str,
    fresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        tracing::info!("Starting fresh crawl (previous pages removed)");
    } else {
        tracing::info!("Starting crawl");
    }
    tracing::info!(
        "Scope: {}, seed URLs: {}",
        config.crawler.scope,
        config.crawler.seeds.len()
    );

    let storage = open_database(&config)?;
    let mut coordinator = Coordinator::new(config, storage, config_hash, fresh)?;

    // Ctrl-C stops the frontier; in-flight pages still finish
    let frontier = coordinator.frontier();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            frontier.stop();
        }
    });

    match coordinator.run().await {
        Ok(report) => {
            print_crawl_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles `add`: stores one document in the corpus
fn handle_add(config: &Config, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SearchEngine::new(open_database(config)?, config.index.clone())?;
    let id = engine.add_document(text)?;
    engine.generate_index()?;
    println!("Added document {}", id);
    Ok(())
}

/// Handles `search`: rebuilds the index and prints ranked documents
fn handle_search(config: &Config, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SearchEngine::new(open_database(config)?, config.index.clone())?;
    engine.generate_index()?;
    let ranked = engine.rank(query)?;
    print_ranking(query, &ranked, config.index.precision);
    Ok(())
}
