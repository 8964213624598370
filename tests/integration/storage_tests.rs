//! Persisting comparisons to an on-disk database

use crate::support::{urls, StubTransport};
use crawl_compare::config::CrawlerConfig;
use crawl_compare::crawler::{Comparison, CrawlComparator, Strategy};
use crawl_compare::storage::{open_storage, save_comparison, Storage, StorageError};
use tempfile::TempDir;

fn stub_comparison() -> Comparison {
    let transport = StubTransport::new()
        .page("https://a.test", "A", 2)
        .page("https://c.test", "C", 5);
    let cooperative = transport.clone();
    let config = CrawlerConfig {
        max_retries: 1,
        retry_delay_ms: 1,
        ..CrawlerConfig::default()
    };

    CrawlComparator::new(
        config,
        move || Ok(transport.clone()),
        move || Ok(cooperative.clone()),
    )
    .compare(&urls(&["https://a.test", "https://b.test", "https://c.test"]))
}

#[test]
fn test_comparison_survives_reopen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("sessions.db");
    let comparison = stub_comparison();

    let session_id = {
        let mut storage = open_storage(&db_path).expect("Failed to open DB");
        save_comparison(&mut storage, &comparison).expect("Failed to save comparison")
    };

    // Reopen to make sure everything reached the file
    let storage = open_storage(&db_path).expect("Failed to reopen DB");

    let session = storage.get_session(session_id).expect("Session missing");
    assert_eq!(session.url_count, 3);
    assert_eq!(session.success_count, 2);
    assert_eq!(session.fail_count, 1);
    assert_eq!(
        session.sequential_time,
        comparison.sequential.as_ref().map(|r| r.elapsed_seconds)
    );

    let results = storage.session_results(session_id).expect("Results missing");
    assert_eq!(results.len(), 9);

    let stored: Vec<(Strategy, String)> = results
        .iter()
        .map(|r| (r.strategy, r.result.url.clone()))
        .collect();
    let expected: Vec<(Strategy, String)> = comparison
        .tagged_results()
        .into_iter()
        .map(|(strategy, r)| (strategy, r.url.clone()))
        .collect();
    assert_eq!(stored, expected);

    let failed = &results[1].result;
    assert!(!failed.success);
    assert_eq!(failed.title, "Connection Error");
    assert!(failed.error.is_some());
}

#[test]
fn test_recent_sessions_and_statistics() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut storage = open_storage(&dir.path().join("sessions.db")).expect("Failed to open DB");

    let first = save_comparison(&mut storage, &stub_comparison()).unwrap();
    let second = save_comparison(&mut storage, &stub_comparison()).unwrap();

    let recent = storage.recent_sessions(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second);
    assert_eq!(recent[1].id, first);

    let stats = storage.statistics().unwrap();
    assert_eq!(stats.total_sessions, 2);
}

#[test]
fn test_missing_session_is_reported() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let storage = open_storage(&dir.path().join("sessions.db")).expect("Failed to open DB");

    assert!(matches!(
        storage.get_session(1),
        Err(StorageError::SessionNotFound(1))
    ));
    assert!(storage.session_results(1).unwrap().is_empty());
}
