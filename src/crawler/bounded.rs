//! Cooperative runner with global and per-host concurrency ceilings
//!
//! Every fetch is spawned at once on a single-threaded tokio runtime. Each
//! attempt must hold a permit from its host's semaphore and then one from the
//! global semaphore before touching the network, so:
//! - at most `global_limit` requests are in flight overall
//! - at most `per_host_limit` requests are in flight to any one host
//!
//! Permits are taken host first, then global, and released when the attempt
//! ends (before any retry pause). A task queued behind its host's ceiling
//! holds no global permit while it waits, so a slow host can tie up at most
//! `per_host_limit` global permits and tasks for other hosts keep getting
//! them. Taking global first would let queued tasks for one busy host sit on
//! global permits they cannot use yet.

use crate::crawler::fetcher::{FetchSettings, PageFetcher};
use crate::crawler::result::{FetchResult, RunSummary, Strategy};
use crate::crawler::transport::{AsyncTransport, Attempt};
use crate::RunnerFault;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use url::Url;

/// Concurrency ceilings for the bounded runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimits {
    pub global: usize,
    pub per_host: usize,
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        Self {
            global: 50,
            per_host: 10,
        }
    }
}

/// Runs every fetch concurrently under [`ConcurrencyLimits`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedRunner {
    limits: ConcurrencyLimits,
}

impl BoundedRunner {
    /// Creates a runner; zero limits are raised to one
    pub fn new(limits: ConcurrencyLimits) -> Self {
        Self {
            limits: ConcurrencyLimits {
                global: limits.global.max(1),
                per_host: limits.per_host.max(1),
            },
        }
    }

    pub fn limits(&self) -> ConcurrencyLimits {
        self.limits
    }

    /// Runs the crawl on a fresh single-threaded runtime
    ///
    /// Blocks the calling thread, which must not be driving another runtime.
    pub fn run<A: AsyncTransport>(
        &self,
        transport: A,
        settings: &FetchSettings,
        urls: &[String],
    ) -> Result<RunSummary, RunnerFault> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RunnerFault::Runtime)?;

        Ok(runtime.block_on(self.run_async(transport, settings, urls)))
    }

    /// Runs the crawl on the current runtime
    pub async fn run_async<A: AsyncTransport>(
        &self,
        transport: A,
        settings: &FetchSettings,
        urls: &[String],
    ) -> RunSummary {
        let started = Instant::now();

        let gate = HostGate::new(transport, self.limits);
        let fetcher = Arc::new(PageFetcher::new(gate, settings.clone()));

        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                let fetcher = Arc::clone(&fetcher);
                let url = url.clone();
                tokio::spawn(async move { fetcher.fetch_async(&url).await })
            })
            .collect();

        let outcomes = futures::future::join_all(handles).await;

        // Gather by task index, attributing faulted tasks to their own URL
        let results = outcomes
            .into_iter()
            .zip(urls)
            .map(|(outcome, url)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Fetch task for {} faulted: {}", url, e);
                    FetchResult::errored(url, &e.to_string(), started.elapsed())
                }
            })
            .collect();

        let summary = RunSummary::new(Strategy::Bounded, results, started.elapsed());
        tracing::info!(
            "Async crawl completed: {} URLs in {}s (limit {}, per host {})",
            urls.len(),
            summary.elapsed_seconds,
            self.limits.global,
            self.limits.per_host
        );
        summary
    }
}

/// Transport wrapper that enforces the concurrency ceilings per attempt
struct HostGate<A> {
    inner: A,
    global: Semaphore,
    hosts: Mutex<HashMap<String, Arc<Semaphore>>>,
    per_host: usize,
}

impl<A> HostGate<A> {
    fn new(inner: A, limits: ConcurrencyLimits) -> Self {
        Self {
            inner,
            global: Semaphore::new(limits.global),
            hosts: Mutex::new(HashMap::new()),
            per_host: limits.per_host,
        }
    }

    fn host_semaphore(&self, url: &str) -> Arc<Semaphore> {
        let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
        let semaphore = hosts
            .entry(host_key(url))
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host)));
        Arc::clone(semaphore)
    }
}

impl<A: AsyncTransport> AsyncTransport for HostGate<A> {
    async fn get(&self, url: &str, timeout: Duration) -> Attempt {
        let host = self.host_semaphore(url);
        let Ok(_host_permit) = host.acquire().await else {
            return Attempt::Failed("Host limiter closed".to_string());
        };
        let Ok(_global_permit) = self.global.acquire().await else {
            return Attempt::Failed("Concurrency limiter closed".to_string());
        };

        self.inner.get(url, timeout).await
    }
}

/// Groups URLs by `host:port`; unparseable URLs each get their own bucket
pub fn host_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => match parsed.port_or_known_default() {
                Some(port) => format!("{}:{}", host.to_lowercase(), port),
                None => host.to_lowercase(),
            },
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}
