//! Crawl-Compare: one URL list, three ways to fetch it
//!
//! This crate fetches a list of URLs, extracts each page's title and outgoing
//! link count, and compares three execution strategies: sequential, a fixed
//! pool of worker threads, and a single-threaded cooperative runtime bounded by
//! global and per-host concurrency ceilings.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod web;

use thiserror::Error;

/// Main error type for Crawl-Compare operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Runner fault: {0}")]
    Runner(#[from] RunnerFault),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in list: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

/// A fault that prevents an entire strategy from running
///
/// Per-URL failures never surface as a `RunnerFault`; they are folded into
/// a failed [`crawler::FetchResult`] instead.
#[derive(Debug, Error)]
pub enum RunnerFault {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(std::io::Error),
}

/// Result type alias for Crawl-Compare operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{AppConfig, CrawlerConfig};
pub use crawler::{Comparison, CrawlComparator, FetchResult, RunSummary, Strategy};
