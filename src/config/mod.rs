//! Configuration module for Crawl-Compare
//!
//! This module handles loading the TOML configuration file, applying
//! environment variable overrides, validating the result, and reading the
//! URL list that drives a comparison.
//!
//! # Example
//!
//! ```no_run
//! use crawl_compare::config::{load_config, load_url_list};
//! use std::path::Path;
//!
//! let config = load_config(None).unwrap();
//! let urls = load_url_list(Path::new(&config.urls_file)).unwrap();
//! println!("{} URLs, {} pool workers", urls.len(), config.crawler.pool_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AppConfig, CrawlerConfig, ServerConfig, StorageConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, load_url_list, parse_url_list};
