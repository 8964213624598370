//! Page fetcher: one URL in, one [`FetchResult`] out
//!
//! The fetcher drives a transport through up to `max_retries` attempts and
//! folds whatever happened into a result record. Retry decisions are made by
//! inspecting each [`Attempt`]:
//!
//! | Attempt | Action |
//! |---------|--------|
//! | Response | Parse title and links → success |
//! | TimedOut | Retry; after the last attempt → "Timeout Error" |
//! | ConnectionFailed | Retry; after the last attempt → "Connection Error" |
//! | Failed | Immediate → "Error" |
//!
//! The blocking path retries immediately; the async path pauses for
//! `retry_delay` between attempts.

use crate::config::CrawlerConfig;
use crate::crawler::parser::parse_page;
use crate::crawler::result::{FetchResult, NO_TITLE};
use crate::crawler::transport::{AsyncTransport, Attempt, Transport};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Per-URL fetch parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Timeout applied to each attempt
    pub timeout: Duration,

    /// Total attempts for retryable failures; values below 1 are treated as 1
    pub max_retries: u32,

    /// Pause between async attempts
    pub retry_delay: Duration,
}

impl FetchSettings {
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            timeout,
            max_retries,
            retry_delay: Duration::from_millis(500),
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Number of attempts actually made for a retryable failure
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

impl From<&CrawlerConfig> for FetchSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self::new(Duration::from_secs(config.timeout_seconds), config.max_retries)
            .with_retry_delay(Duration::from_millis(config.retry_delay_ms))
    }
}

/// Fetches and parses pages through a transport
pub struct PageFetcher<T> {
    transport: T,
    settings: FetchSettings,
}

impl<T> PageFetcher<T> {
    pub fn new(transport: T, settings: FetchSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }
}

impl<T: Transport> PageFetcher<T> {
    /// Fetches a URL on the calling thread, retrying immediately
    pub fn fetch(&self, url: &str) -> FetchResult {
        let started = Instant::now();
        let attempts = self.settings.attempts();
        let mut attempt = 1;

        loop {
            let outcome = self.transport.get(url, self.settings.timeout);
            if let Some(result) = settle(url, outcome, attempt, attempts, started) {
                return result;
            }
            attempt += 1;
        }
    }

    /// Like [`fetch`](Self::fetch), but a panic in the transport or parser
    /// becomes an `Error` result for `url` instead of unwinding
    pub fn fetch_isolated(&self, url: &str) -> FetchResult {
        let started = Instant::now();
        panic::catch_unwind(AssertUnwindSafe(|| self.fetch(url))).unwrap_or_else(|payload| {
            let message = panic_message(&*payload);
            tracing::error!("Fetch of {} panicked: {}", url, message);
            FetchResult::errored(url, &message, started.elapsed())
        })
    }
}

impl<T: AsyncTransport> PageFetcher<T> {
    /// Fetches a URL cooperatively, pausing between attempts
    pub async fn fetch_async(&self, url: &str) -> FetchResult {
        let started = Instant::now();
        let attempts = self.settings.attempts();
        let mut attempt = 1;

        loop {
            let outcome = self.transport.get(url, self.settings.timeout).await;
            if let Some(result) = settle(url, outcome, attempt, attempts, started) {
                return result;
            }
            attempt += 1;
            tokio::time::sleep(self.settings.retry_delay).await;
        }
    }
}

/// Turns one attempt into a final result, or `None` to try again
fn settle(
    url: &str,
    outcome: Attempt,
    attempt: u32,
    attempts: u32,
    started: Instant,
) -> Option<FetchResult> {
    let last = attempt >= attempts;

    match outcome {
        Attempt::Response { status_code, body } => Some(build_result(url, status_code, &body, started)),
        Attempt::TimedOut => {
            tracing::warn!("Timeout on attempt {} for {}", attempt, url);
            last.then(|| FetchResult::timed_out(url, started.elapsed()))
        }
        Attempt::ConnectionFailed(message) => {
            tracing::warn!(
                "Connection error on attempt {} for {}: {}",
                attempt,
                url,
                message
            );
            last.then(|| FetchResult::connection_failed(url, &message, started.elapsed()))
        }
        Attempt::Failed(message) => {
            tracing::error!("Error crawling {}: {}", url, message);
            Some(FetchResult::errored(url, &message, started.elapsed()))
        }
    }
}

/// Extracts a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn build_result(url: &str, status_code: u16, body: &str, started: Instant) -> FetchResult {
    match parse_page(body) {
        Ok(page) => {
            tracing::info!("Successfully crawled {} - Status: {}", url, status_code);
            let title = page.title.unwrap_or_else(|| NO_TITLE.to_string());
            FetchResult::success(url, title, page.link_count, status_code, started.elapsed())
        }
        Err(message) => {
            tracing::error!("Failed to parse {}: {}", url, message);
            FetchResult::errored(url, &message, started.elapsed())
        }
    }
}
