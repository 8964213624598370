//! One URL at a time, in order, on the calling thread
//!
//! A fetch that panics is recorded as an `Error` result for its URL and the
//! run carries on with the next one.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::result::{RunSummary, Strategy};
use crate::crawler::transport::Transport;
use std::time::Instant;

/// Runs the fetcher over every URL in list order
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialRunner;

impl SequentialRunner {
    pub fn run<T: Transport>(&self, fetcher: &PageFetcher<T>, urls: &[String]) -> RunSummary {
        let started = Instant::now();

        let results = urls.iter().map(|url| fetcher.fetch_isolated(url)).collect();

        let summary = RunSummary::new(Strategy::Sequential, results, started.elapsed());
        tracing::info!(
            "Sequential crawl completed: {} URLs in {}s",
            urls.len(),
            summary.elapsed_seconds
        );
        summary
    }
}
