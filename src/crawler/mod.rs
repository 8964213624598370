//! Crawl engine: fetching, parsing, and the three orchestration strategies
//!
//! This module contains:
//! - The per-URL fetcher with timeout/retry handling
//! - Title and link-count extraction
//! - Sequential, thread-pool, and bounded cooperative runners
//! - The comparator that runs them side by side

mod bounded;
mod comparator;
mod fetcher;
mod parser;
mod pooled;
mod result;
mod sequential;
mod transport;

pub use bounded::{host_key, BoundedRunner, ConcurrencyLimits};
pub use comparator::{speedup_ratio, Comparison, CrawlComparator, SessionSummary};
pub use fetcher::{FetchSettings, PageFetcher};
pub use parser::{parse_page, ParsedPage};
pub use pooled::PooledRunner;
pub use result::{
    truncate_chars, FetchResult, RunSummary, Strategy, CONNECTION_TITLE, ERROR_TITLE,
    MAX_ERROR_LEN, NO_TITLE, TIMEOUT_TITLE,
};
pub use sequential::SequentialRunner;
pub use transport::{AsyncHttpTransport, AsyncTransport, Attempt, BlockingHttpTransport, Transport};

use crate::config::CrawlerConfig;

/// Runs a comparison over real HTTP
///
/// This is the main entry point for callers that only need the default
/// transports. It blocks the calling thread until every enabled strategy has
/// finished.
///
/// # Arguments
///
/// * `urls` - Absolute URLs to fetch, in the order results should appear
/// * `config` - Crawler tuning and enabled strategies
pub fn compare(urls: &[String], config: &CrawlerConfig) -> Comparison {
    CrawlComparator::with_http(config.clone()).compare(urls)
}
