//! Comparator behavior over stub transports

use crate::support::{urls, StubTransport};
use crawl_compare::config::CrawlerConfig;
use crawl_compare::crawler::{CrawlComparator, Strategy, CONNECTION_TITLE};
use crawl_compare::RunnerFault;
use std::io;

fn config(max_retries: u32, strategies: Vec<Strategy>) -> CrawlerConfig {
    CrawlerConfig {
        max_retries,
        retry_delay_ms: 1,
        pool_workers: 4,
        strategies,
        ..CrawlerConfig::default()
    }
}

fn comparator(
    config: CrawlerConfig,
    transport: StubTransport,
) -> CrawlComparator<StubTransport, StubTransport> {
    let cooperative = transport.clone();
    CrawlComparator::new(
        config,
        move || Ok(transport.clone()),
        move || Ok(cooperative.clone()),
    )
}

#[test]
fn test_one_success_one_connection_failure() {
    let transport = StubTransport::new().page("https://a.test", "A", 2);
    let input = urls(&["https://a.test", "https://b.test"]);

    let comparison = comparator(config(1, Strategy::ALL.to_vec()), transport.clone()).compare(&input);

    for run in comparison.summaries() {
        let a = &run.results[0];
        assert_eq!(a.url, "https://a.test");
        assert!(a.success);
        assert_eq!(a.title, "A");
        assert_eq!(a.link_count, 2);

        let b = &run.results[1];
        assert_eq!(b.url, "https://b.test");
        assert!(!b.success);
        assert_eq!(b.title, CONNECTION_TITLE);
        assert!(b
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Connection failed")));
    }

    assert_eq!(comparison.summaries().count(), 3);
    assert_eq!(comparison.url_count, 2);
    assert_eq!(comparison.success_count, 1);
    assert_eq!(comparison.fail_count, 1);

    // One attempt per URL per strategy with a single retry allowed
    assert_eq!(transport.calls(), 6);
}

#[test]
fn test_disabled_strategies_are_omitted() {
    let transport = StubTransport::new().page("https://a.test", "A", 2);
    let input = urls(&["https://a.test"]);

    let comparison = comparator(config(1, vec![Strategy::Sequential]), transport).compare(&input);

    assert!(comparison.sequential.is_some());
    assert!(comparison.pooled.is_none());
    assert!(comparison.bounded.is_none());
    assert_eq!(comparison.speedup(Strategy::Pooled), None);

    // Counts fall back to the run that did happen
    assert_eq!(comparison.success_count, 1);
}

#[test]
fn test_faulted_strategy_is_omitted() {
    let transport = StubTransport::new().page("https://a.test", "A", 2);
    let input = urls(&["https://a.test"]);

    let comparator: CrawlComparator<StubTransport, StubTransport> = CrawlComparator::new(
        config(1, Strategy::ALL.to_vec()),
        move || Ok(transport.clone()),
        || {
            Err(RunnerFault::Runtime(io::Error::new(
                io::ErrorKind::Other,
                "no runtime",
            )))
        },
    );
    let comparison = comparator.compare(&input);

    assert!(comparison.sequential.is_some());
    assert!(comparison.pooled.is_some());
    assert!(comparison.bounded.is_none());
    assert_eq!(comparison.success_count, 1);
}

#[test]
fn test_empty_url_list() {
    let comparison = comparator(config(2, Strategy::ALL.to_vec()), StubTransport::new()).compare(&[]);

    assert_eq!(comparison.url_count, 0);
    assert_eq!(comparison.summaries().count(), 3);
    for run in comparison.summaries() {
        assert!(run.results.is_empty());
        assert!(run.elapsed_seconds >= 0.0);
    }
    assert_eq!(comparison.success_count, 0);
    assert_eq!(comparison.fail_count, 0);
}

#[test]
fn test_session_summary_and_tags() {
    let transport = StubTransport::new()
        .page("https://a.test", "A", 2)
        .page("https://b.test", "B", 3);
    let input = urls(&["https://a.test", "https://b.test"]);

    let comparison = comparator(config(1, Strategy::ALL.to_vec()), transport).compare(&input);
    let session = comparison.session_summary();

    assert_eq!(session.url_count, 2);
    assert_eq!(session.success_count, 2);
    assert_eq!(session.fail_count, 0);
    assert!(session.sequential_time.is_some());
    assert!(session.pooled_time.is_some());
    assert!(session.bounded_time.is_some());

    let tagged = comparison.tagged_results();
    assert_eq!(tagged.len(), 6);
    assert_eq!(tagged[0].0, Strategy::Sequential);
    assert_eq!(tagged[2].0, Strategy::Pooled);
    assert_eq!(tagged[5].0, Strategy::Bounded);
    assert_eq!(tagged[5].1.title, "B");
}

#[test]
fn test_comparison_serializes_to_json() {
    let transport = StubTransport::new().page("https://a.test", "A", 2);
    let comparison =
        comparator(config(1, vec![Strategy::Pooled]), transport).compare(&urls(&["https://a.test"]));

    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["url_count"], 1);
    assert_eq!(json["pooled"]["strategy"], "pooled");
    assert_eq!(json["pooled"]["results"][0]["title"], "A");
    assert!(json["sequential"].is_null());
}

#[test]
fn test_panicking_fetch_does_not_stop_other_strategies() {
    let transport = StubTransport::new().page("https://a.test", "A", 2);
    let input = urls(&["https://a.test", "https://panic.test"]);

    let comparison = comparator(config(1, Strategy::ALL.to_vec()), transport).compare(&input);

    assert!(comparison.sequential.is_some());
    assert!(comparison.pooled.is_some());
    assert!(comparison.bounded.is_some());

    for run in comparison.summaries() {
        assert_eq!(run.results.len(), 2, "{} run", run.strategy);
        assert!(run.results[0].success);

        let failed = &run.results[1];
        assert_eq!(failed.url, "https://panic.test");
        assert!(!failed.success);
        assert!(failed.error.is_some());
    }
    assert_eq!(comparison.success_count, 1);
    assert_eq!(comparison.fail_count, 1);
}

#[test]
fn test_strategy_that_panics_while_starting_is_omitted() {
    let transport = StubTransport::new().page("https://a.test", "A", 2);
    let input = urls(&["https://a.test"]);

    let comparator: CrawlComparator<StubTransport, StubTransport> = CrawlComparator::new(
        config(1, Strategy::ALL.to_vec()),
        move || Ok(transport.clone()),
        || -> Result<StubTransport, RunnerFault> { panic!("cooperative transport unavailable") },
    );
    let comparison = comparator.compare(&input);

    assert!(comparison.sequential.is_some());
    assert!(comparison.pooled.is_some());
    assert!(comparison.bounded.is_none());
}

#[test]
fn test_strategies_run_in_fixed_order_regardless_of_config_order() {
    let transport = StubTransport::new().page("https://a.test", "A", 2);
    let input = urls(&["https://a.test"]);

    let comparison = comparator(
        config(1, vec![Strategy::Bounded, Strategy::Sequential]),
        transport,
    )
    .compare(&input);

    let order: Vec<Strategy> = comparison.summaries().map(|run| run.strategy).collect();
    assert_eq!(order, vec![Strategy::Sequential, Strategy::Bounded]);
    assert!(comparison.pooled.is_none());
}
