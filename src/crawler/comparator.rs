//! Runs every enabled strategy over the same URL list
//!
//! Each strategy gets its own freshly built transport, so comparisons share
//! no mutable state with each other or with concurrent callers. A strategy
//! that cannot run at all is logged and left out of the [`Comparison`].

use crate::config::CrawlerConfig;
use crate::crawler::bounded::{BoundedRunner, ConcurrencyLimits};
use crate::crawler::fetcher::{panic_message, FetchSettings, PageFetcher};
use crate::crawler::pooled::PooledRunner;
use crate::crawler::result::{FetchResult, RunSummary, Strategy};
use crate::crawler::sequential::SequentialRunner;
use crate::crawler::transport::{AsyncHttpTransport, AsyncTransport, BlockingHttpTransport, Transport};
use crate::RunnerFault;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

type Factory<T> = Box<dyn Fn() -> Result<T, RunnerFault> + Send + Sync>;

/// Public entry point of the crawl engine
pub struct CrawlComparator<T, A> {
    config: CrawlerConfig,
    blocking: Factory<T>,
    cooperative: Factory<A>,
}

impl CrawlComparator<BlockingHttpTransport, AsyncHttpTransport> {
    /// Builds a comparator that fetches over real HTTP
    ///
    /// Comparisons must run on a thread that is not driving an async runtime
    /// (for example inside `tokio::task::spawn_blocking`).
    pub fn with_http(config: CrawlerConfig) -> Self {
        let blocking_agent = config.user_agent.clone();
        let async_agent = config.user_agent.clone();

        Self::new(
            config,
            move || Ok(BlockingHttpTransport::new(&blocking_agent)?),
            move || Ok(AsyncHttpTransport::new(&async_agent)?),
        )
    }
}

impl<T: Transport, A: AsyncTransport> CrawlComparator<T, A> {
    /// Creates a comparator from transport factories
    ///
    /// `blocking` feeds the sequential and pooled runners, `cooperative`
    /// feeds the bounded runner. Each is called once per strategy run.
    pub fn new<B, C>(config: CrawlerConfig, blocking: B, cooperative: C) -> Self
    where
        B: Fn() -> Result<T, RunnerFault> + Send + Sync + 'static,
        C: Fn() -> Result<A, RunnerFault> + Send + Sync + 'static,
    {
        Self {
            config,
            blocking: Box::new(blocking),
            cooperative: Box::new(cooperative),
        }
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Runs every enabled strategy over `urls`
    ///
    /// Disabled strategies, strategies that hit a [`RunnerFault`] and
    /// strategies that panic outside a single fetch are absent from the
    /// result; the others still run.
    pub fn compare(&self, urls: &[String]) -> Comparison {
        let mut comparison = Comparison::empty(urls.len());

        for strategy in Strategy::ALL {
            if !self.config.is_enabled(strategy) {
                continue;
            }

            tracing::info!("Running {} crawl over {} URLs", strategy, urls.len());
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_strategy(strategy, urls)));
            match outcome {
                Ok(Ok(summary)) => comparison.insert(summary),
                Ok(Err(fault)) => {
                    tracing::error!("{} crawl could not run: {}", strategy, fault);
                }
                Err(payload) => {
                    tracing::error!("{} crawl panicked: {}", strategy, panic_message(&*payload));
                }
            }
        }

        comparison.tally();
        comparison
    }

    /// Runs a single strategy regardless of whether it is enabled
    pub fn run_strategy(&self, strategy: Strategy, urls: &[String]) -> Result<RunSummary, RunnerFault> {
        let settings = FetchSettings::from(&self.config);

        match strategy {
            Strategy::Sequential => {
                let fetcher = PageFetcher::new((self.blocking)()?, settings);
                Ok(SequentialRunner.run(&fetcher, urls))
            }
            Strategy::Pooled => {
                let fetcher = PageFetcher::new((self.blocking)()?, settings);
                PooledRunner::new(self.config.pool_workers).run(&fetcher, urls)
            }
            Strategy::Bounded => {
                let runner = BoundedRunner::new(ConcurrencyLimits {
                    global: self.config.concurrent_limit,
                    per_host: self.config.per_host_limit,
                });
                runner.run((self.cooperative)()?, &settings, urls)
            }
        }
    }
}

/// Outcome of one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub url_count: usize,
    pub sequential: Option<RunSummary>,
    pub pooled: Option<RunSummary>,
    pub bounded: Option<RunSummary>,

    /// Successes in the reporting run (pooled when present)
    pub success_count: usize,

    /// Failures in the reporting run (pooled when present)
    pub fail_count: usize,
}

impl Comparison {
    fn empty(url_count: usize) -> Self {
        Self {
            url_count,
            sequential: None,
            pooled: None,
            bounded: None,
            success_count: 0,
            fail_count: 0,
        }
    }

    fn insert(&mut self, summary: RunSummary) {
        match summary.strategy {
            Strategy::Sequential => self.sequential = Some(summary),
            Strategy::Pooled => self.pooled = Some(summary),
            Strategy::Bounded => self.bounded = Some(summary),
        }
    }

    /// Derives the headline counts from the reporting run
    fn tally(&mut self) {
        let (success, fail) = self
            .reporting_run()
            .map(|run| (run.success_count(), run.fail_count()))
            .unwrap_or((0, 0));
        self.success_count = success;
        self.fail_count = fail;
    }

    pub fn get(&self, strategy: Strategy) -> Option<&RunSummary> {
        match strategy {
            Strategy::Sequential => self.sequential.as_ref(),
            Strategy::Pooled => self.pooled.as_ref(),
            Strategy::Bounded => self.bounded.as_ref(),
        }
    }

    /// Summaries that actually ran, in run order
    pub fn summaries(&self) -> impl Iterator<Item = &RunSummary> {
        Strategy::ALL.into_iter().filter_map(move |s| self.get(s))
    }

    /// The run whose counts are reported: pooled, else bounded, else sequential
    pub fn reporting_run(&self) -> Option<&RunSummary> {
        self.pooled
            .as_ref()
            .or(self.bounded.as_ref())
            .or(self.sequential.as_ref())
    }

    /// Sequential time divided by `strategy`'s time, to two decimals
    ///
    /// `None` when either run is missing or the divisor is zero.
    pub fn speedup(&self, strategy: Strategy) -> Option<f64> {
        let baseline = self.sequential.as_ref()?.elapsed_seconds;
        let other = self.get(strategy)?.elapsed_seconds;
        speedup_ratio(baseline, other)
    }

    /// Session-level aggregate handed to the persistence layer
    pub fn session_summary(&self) -> SessionSummary {
        SessionSummary {
            url_count: self.url_count,
            sequential_time: self.sequential.as_ref().map(|r| r.elapsed_seconds),
            pooled_time: self.pooled.as_ref().map(|r| r.elapsed_seconds),
            bounded_time: self.bounded.as_ref().map(|r| r.elapsed_seconds),
            success_count: self.success_count,
            fail_count: self.fail_count,
            speedup_pooled: self.speedup(Strategy::Pooled),
            speedup_bounded: self.speedup(Strategy::Bounded),
        }
    }

    /// Every per-URL result, tagged with the strategy that produced it
    pub fn tagged_results(&self) -> Vec<(Strategy, &FetchResult)> {
        self.summaries()
            .flat_map(|run| run.results.iter().map(move |r| (run.strategy, r)))
            .collect()
    }
}

/// Aggregate values of one comparison, ready to persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub url_count: usize,
    pub sequential_time: Option<f64>,
    pub pooled_time: Option<f64>,
    pub bounded_time: Option<f64>,
    pub success_count: usize,
    pub fail_count: usize,
    pub speedup_pooled: Option<f64>,
    pub speedup_bounded: Option<f64>,
}

/// `baseline / other` rounded to two decimals, guarding against zero
pub fn speedup_ratio(baseline: f64, other: f64) -> Option<f64> {
    if other > 0.0 {
        Some((baseline / other * 100.0).round() / 100.0)
    } else {
        None
    }
}
