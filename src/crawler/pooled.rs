//! Fixed-size pool of OS worker threads
//!
//! Workers pull URL indices from a shared cursor and fetch synchronously.
//! Each worker keeps its own `(index, result)` list; the lists are merged by
//! index once every worker has finished, so completion order never leaks
//! into the summary.

use crate::crawler::fetcher::{panic_message, PageFetcher};
use crate::crawler::result::{FetchResult, RunSummary, Strategy};
use crate::crawler::transport::Transport;
use crate::RunnerFault;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

/// Runs the fetcher across `workers` threads
#[derive(Debug, Clone, Copy)]
pub struct PooledRunner {
    workers: usize,
}

impl PooledRunner {
    /// Creates a runner; a worker count of zero is raised to one
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetches every URL and returns results in input order
    ///
    /// Fails only if not a single worker thread could be started.
    pub fn run<T: Transport>(
        &self,
        fetcher: &PageFetcher<T>,
        urls: &[String],
    ) -> Result<RunSummary, RunnerFault> {
        let started = Instant::now();
        let worker_count = self.workers.min(urls.len());
        let cursor = AtomicUsize::new(0);

        let mut slots: Vec<Option<FetchResult>> = vec![None; urls.len()];

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(worker_count);
            let mut spawn_error = None;

            for id in 0..worker_count {
                let spawned = thread::Builder::new()
                    .name(format!("fetch-worker-{}", id))
                    .spawn_scoped(scope, || work(fetcher, urls, &cursor));

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        tracing::warn!("Failed to spawn worker {}: {}", id, e);
                        spawn_error = Some(e);
                        break;
                    }
                }
            }

            if handles.is_empty() {
                if let Some(e) = spawn_error {
                    return Err(RunnerFault::WorkerSpawn(e));
                }
            }

            for handle in handles {
                match handle.join() {
                    Ok(done) => {
                        for (index, result) in done {
                            slots[index] = Some(result);
                        }
                    }
                    Err(payload) => {
                        tracing::error!("Worker thread panicked: {}", panic_message(&*payload));
                    }
                }
            }

            Ok(())
        })?;

        // A slot is only empty if its worker died outside of a fetch
        let results = slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    FetchResult::errored(url, "Worker thread terminated", started.elapsed())
                })
            })
            .collect();

        let summary = RunSummary::new(Strategy::Pooled, results, started.elapsed());
        tracing::info!(
            "Threaded crawl completed: {} URLs in {}s ({} workers)",
            urls.len(),
            summary.elapsed_seconds,
            worker_count
        );
        Ok(summary)
    }
}

/// Worker loop: claim the next index until the list is exhausted
fn work<T: Transport>(
    fetcher: &PageFetcher<T>,
    urls: &[String],
    cursor: &AtomicUsize,
) -> Vec<(usize, FetchResult)> {
    let mut done = Vec::new();

    loop {
        let index = cursor.fetch_add(1, Ordering::Relaxed);
        let Some(url) = urls.get(index) else {
            break;
        };

        done.push((index, fetcher.fetch_isolated(url)));
    }

    done
}
