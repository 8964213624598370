//! Runner behavior over stub transports

use crate::support::{urls, BlockingRecorder, ConcurrencyRecorder, StubTransport};
use crawl_compare::crawler::{
    BoundedRunner, ConcurrencyLimits, FetchResult, FetchSettings, PageFetcher, PooledRunner,
    SequentialRunner, CONNECTION_TITLE, ERROR_TITLE,
};
use std::sync::Arc;
use std::time::Duration;

fn settings() -> FetchSettings {
    FetchSettings::new(Duration::from_secs(5), 2).with_retry_delay(Duration::from_millis(1))
}

fn stub() -> StubTransport {
    StubTransport::new()
        .page("https://a.test/", "A", 2)
        .page("https://b.test/", "B", 0)
        .page("https://c.test/", "C", 7)
        .page("https://a.test/deep", "Deep", 1)
}

fn mixed_urls() -> Vec<String> {
    urls(&[
        "https://c.test/",
        "https://down.test/",
        "https://a.test/",
        "https://b.test/",
        "https://a.test/deep",
    ])
}

/// Title and link count, the parts of a result that do not depend on timing
fn contents(results: &[FetchResult]) -> Vec<(String, String, u32, bool)> {
    results
        .iter()
        .map(|r| (r.url.clone(), r.title.clone(), r.link_count, r.success))
        .collect()
}

#[test]
fn test_sequential_preserves_input_order() {
    let fetcher = PageFetcher::new(stub(), settings());
    let input = mixed_urls();

    let summary = SequentialRunner.run(&fetcher, &input);

    let output: Vec<&str> = summary.results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(output, input.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(summary.results[0].title, "C");
    assert_eq!(summary.results[0].link_count, 7);
    assert_eq!(summary.results[1].title, CONNECTION_TITLE);
}

#[test]
fn test_pooled_preserves_input_order() {
    let fetcher = PageFetcher::new(stub(), settings());
    let input = mixed_urls();

    let summary = PooledRunner::new(3).run(&fetcher, &input).unwrap();

    assert_eq!(summary.results.len(), input.len());
    for (result, url) in summary.results.iter().zip(&input) {
        assert_eq!(&result.url, url);
    }
}

#[test]
fn test_pooled_runs_at_most_worker_count_in_parallel() {
    let recorder = Arc::new(BlockingRecorder::default());
    let fetcher = PageFetcher::new(Arc::clone(&recorder), settings());
    let input: Vec<String> = (0..9).map(|i| format!("https://a.test/{}", i)).collect();

    let summary = PooledRunner::new(3).run(&fetcher, &input).unwrap();

    assert_eq!(summary.success_count(), 9);
    assert_eq!(recorder.calls(), 9);
    assert!(recorder.peak() <= 3, "peak {}", recorder.peak());
    assert!(recorder.peak() >= 2, "peak {}", recorder.peak());
}

#[test]
fn test_single_worker_pool_matches_sequential() {
    let input = mixed_urls();

    let sequential = SequentialRunner.run(&PageFetcher::new(stub(), settings()), &input);
    let pooled = PooledRunner::new(1)
        .run(&PageFetcher::new(stub(), settings()), &input)
        .unwrap();

    assert_eq!(contents(&sequential.results), contents(&pooled.results));
}

#[test]
fn test_sequential_is_idempotent() {
    let fetcher = PageFetcher::new(stub(), settings());
    let input = mixed_urls();

    let first = SequentialRunner.run(&fetcher, &input);
    let second = SequentialRunner.run(&fetcher, &input);

    assert_eq!(contents(&first.results), contents(&second.results));
}

#[test]
fn test_every_result_is_success_xor_error() {
    let input = mixed_urls();
    let summary = SequentialRunner.run(&PageFetcher::new(stub(), settings()), &input);

    for result in &summary.results {
        assert_ne!(result.success, result.error.is_some(), "{:?}", result);
    }
}

#[test]
fn test_connection_failures_retry_up_to_limit() {
    let transport = stub();
    let fetcher = PageFetcher::new(transport.clone(), settings());

    let summary = SequentialRunner.run(&fetcher, &urls(&["https://down.test/"]));

    assert!(!summary.results[0].success);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_empty_list_yields_empty_runs() {
    let fetcher = PageFetcher::new(stub(), settings());

    let sequential = SequentialRunner.run(&fetcher, &[]);
    assert!(sequential.results.is_empty());
    assert!(sequential.elapsed_seconds >= 0.0);

    let pooled = PooledRunner::new(4).run(&fetcher, &[]).unwrap();
    assert!(pooled.results.is_empty());

    let bounded = BoundedRunner::default()
        .run_async(stub(), &settings(), &[])
        .await;
    assert!(bounded.results.is_empty());
    assert!(bounded.elapsed_seconds >= 0.0);
}

#[test]
fn test_pooled_isolates_panicking_fetch() {
    let fetcher = PageFetcher::new(stub(), settings());
    let input = urls(&["https://a.test/", "https://panic.test/", "https://b.test/"]);

    let summary = PooledRunner::new(2).run(&fetcher, &input).unwrap();

    assert_eq!(summary.results.len(), 3);
    assert!(summary.results[0].success);
    assert!(summary.results[2].success);

    let failed = &summary.results[1];
    assert_eq!(failed.url, "https://panic.test/");
    assert_eq!(failed.title, ERROR_TITLE);
    assert!(!failed.success);
    assert!(failed
        .error
        .as_deref()
        .is_some_and(|e| e.contains("stub transport refused")));
}

#[test]
fn test_sequential_isolates_panicking_fetch() {
    let fetcher = PageFetcher::new(stub(), settings());
    let input = urls(&["https://panic.test/", "https://a.test/"]);

    let summary = SequentialRunner.run(&fetcher, &input);

    assert_eq!(summary.results.len(), 2);
    let failed = &summary.results[0];
    assert_eq!(failed.url, "https://panic.test/");
    assert_eq!(failed.title, ERROR_TITLE);
    assert!(failed
        .error
        .as_deref()
        .is_some_and(|e| e.contains("stub transport refused")));
    assert!(summary.results[1].success);
}

#[tokio::test]
async fn test_bounded_isolates_panicking_task() {
    let input = urls(&["https://a.test/", "https://panic.test/", "https://b.test/"]);

    let summary = BoundedRunner::default()
        .run_async(stub(), &settings(), &input)
        .await;

    assert_eq!(summary.results.len(), 3);
    assert!(summary.results[0].success);
    assert!(summary.results[2].success);
    assert_eq!(summary.results[1].url, "https://panic.test/");
    assert!(!summary.results[1].success);
    assert!(summary.results[1].error.is_some());
}

#[tokio::test]
async fn test_bounded_preserves_input_order() {
    let input = mixed_urls();

    let summary = BoundedRunner::default()
        .run_async(stub(), &settings(), &input)
        .await;

    let sequential = SequentialRunner.run(&PageFetcher::new(stub(), settings()), &input);
    assert_eq!(contents(&summary.results), contents(&sequential.results));
}

#[tokio::test]
async fn test_bounded_respects_per_host_limit() {
    let recorder = Arc::new(ConcurrencyRecorder::default());
    let mut input = Vec::new();
    for i in 0..8 {
        input.push(format!("https://a.test/{}", i));
        input.push(format!("https://b.test/{}", i));
    }

    let runner = BoundedRunner::new(ConcurrencyLimits {
        global: 10,
        per_host: 2,
    });
    let summary = runner
        .run_async(Arc::clone(&recorder), &settings(), &input)
        .await;

    assert_eq!(summary.success_count(), input.len());
    assert!(recorder.host_peak("a.test:443") <= 2);
    assert!(recorder.host_peak("b.test:443") <= 2);
    assert!(recorder.host_peak("a.test:443") >= 1);
    assert!(recorder.global_peak() <= 4);
}

#[tokio::test]
async fn test_bounded_respects_global_limit() {
    let recorder = Arc::new(ConcurrencyRecorder::default());
    let input: Vec<String> = (0..12).map(|i| format!("https://host{}.test/", i)).collect();

    let runner = BoundedRunner::new(ConcurrencyLimits {
        global: 3,
        per_host: 10,
    });
    let summary = runner
        .run_async(Arc::clone(&recorder), &settings(), &input)
        .await;

    assert_eq!(summary.results.len(), 12);
    assert!(recorder.global_peak() <= 3);
    assert!(recorder.global_peak() >= 1);
}

#[test]
fn test_bounded_run_on_own_runtime() {
    let input = mixed_urls();

    let summary = BoundedRunner::default()
        .run(stub(), &settings(), &input)
        .unwrap();

    assert_eq!(summary.results.len(), input.len());
    assert_eq!(summary.success_count(), 4);
    assert_eq!(summary.fail_count(), 1);
}
