//! Crawl-Compare main entry point
//!
//! This is the command-line interface for comparing crawl strategies.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crawl_compare::config::{load_config, load_url_list, AppConfig};
use crawl_compare::crawler::compare;
use crawl_compare::output::{load_statistics, print_report, print_sessions, print_statistics};
use crawl_compare::storage::{open_storage, save_comparison, SqliteStorage, Storage};
use crawl_compare::web::{self, AppState};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Crawl-Compare: one URL list, three ways to fetch it
///
/// Fetches every URL sequentially, on a thread pool, and on a bounded
/// cooperative runtime, then reports timings and speedups.
#[derive(Parser, Debug)]
#[command(name = "crawl-compare")]
#[command(version = "1.0.0")]
#[command(about = "Compare sequential, threaded and async crawling", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one comparison and print the report
    Compare {
        /// URL list to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        urls: Option<PathBuf>,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,

        /// Do not persist the comparison even if storage is configured
        #[arg(long)]
        no_save: bool,
    },

    /// Start the web server
    Serve,

    /// Show aggregate statistics from the database
    Stats,

    /// List recent sessions from the database
    Sessions {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet, &config.log_level);

    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    match cli.command {
        Command::Compare {
            urls,
            json,
            no_save,
        } => handle_compare(&config, urls.as_deref(), json, no_save),
        Command::Serve => handle_serve(config),
        Command::Stats => handle_stats(&config),
        Command::Sessions { limit } => handle_sessions(&config, limit),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_level: &str) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new(format!("crawl_compare={},warn", log_level)),
            1 => EnvFilter::new("crawl_compare=debug,info"),
            2 => EnvFilter::new("crawl_compare=trace,debug"),
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

/// Opens the configured database, if any
fn configured_storage(config: &AppConfig) -> anyhow::Result<Option<SqliteStorage>> {
    match config.storage.database_path.as_deref() {
        Some(path) if config.storage.is_configured() => {
            let storage = open_storage(Path::new(path))
                .with_context(|| format!("Failed to open database {}", path))?;
            Ok(Some(storage))
        }
        _ => Ok(None),
    }
}

fn require_storage(config: &AppConfig) -> anyhow::Result<SqliteStorage> {
    match configured_storage(config)? {
        Some(storage) => Ok(storage),
        None => bail!("No database configured (set storage.database-path or DATABASE_PATH)"),
    }
}

/// Handles the compare command: runs once and prints the result
fn handle_compare(
    config: &AppConfig,
    urls_file: Option<&Path>,
    json: bool,
    no_save: bool,
) -> anyhow::Result<()> {
    let urls_file = urls_file.unwrap_or_else(|| Path::new(&config.urls_file));
    let urls = load_url_list(urls_file)
        .with_context(|| format!("Failed to load URL list {}", urls_file.display()))?;
    tracing::info!("Loaded {} URLs from {}", urls.len(), urls_file.display());

    let comparison = compare(&urls, &config.crawler);

    if !no_save {
        if let Some(mut storage) = configured_storage(config)? {
            if let Err(e) = save_comparison(&mut storage, &comparison) {
                tracing::error!("Failed to persist comparison: {}", e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print_report(&comparison);
    }

    Ok(())
}

/// Handles the serve command: starts the web server on its own runtime
fn handle_serve(config: AppConfig) -> anyhow::Result<()> {
    let urls_file = Path::new(&config.urls_file);
    let urls = load_url_list(urls_file)
        .with_context(|| format!("Failed to load URL list {}", urls_file.display()))?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let storage = configured_storage(&config)?;
    let state = AppState::new(config, urls, storage);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    runtime.block_on(web::serve(state, addr))?;

    Ok(())
}

/// Handles the stats command: shows statistics from the database
fn handle_stats(config: &AppConfig) -> anyhow::Result<()> {
    let storage = require_storage(config)?;

    if let Some(path) = &config.storage.database_path {
        println!("Database: {}\n", path);
    }

    let report = load_statistics(&storage, 5)?;
    print_statistics(&report);

    Ok(())
}

/// Handles the sessions command: lists recent sessions
fn handle_sessions(config: &AppConfig, limit: usize) -> anyhow::Result<()> {
    let storage = require_storage(config)?;
    let sessions = storage.recent_sessions(limit)?;
    print_sessions(&sessions);

    Ok(())
}
