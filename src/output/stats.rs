//! Statistics generation from the session database
//!
//! This module provides functionality for extracting and displaying
//! aggregate comparison statistics from the storage layer.

use crate::output::{format_seconds, format_speedup};
use crate::storage::{SessionRecord, SessionStatistics, Storage, StorageResult};

/// Aggregates plus the most recent sessions
#[derive(Debug, Clone)]
pub struct StatisticsReport {
    pub statistics: SessionStatistics,

    /// Newest first
    pub recent: Vec<SessionRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `recent` - How many recent sessions to include
///
/// # Returns
///
/// * `Ok(StatisticsReport)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage, recent: usize) -> StorageResult<StatisticsReport> {
    let statistics = storage.statistics()?;
    let recent = storage.recent_sessions(recent)?;

    Ok(StatisticsReport { statistics, recent })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(report: &StatisticsReport) {
    println!("=== Comparison Statistics ===\n");

    println!("Overview:");
    println!("  Total sessions: {}", report.statistics.total_sessions);
    println!(
        "  Average thread pool speedup: {}",
        format_speedup(report.statistics.average_speedup_pooled)
    );
    println!(
        "  Average bounded async speedup: {}",
        format_speedup(report.statistics.average_speedup_bounded)
    );
    println!();

    if !report.recent.is_empty() {
        print_sessions(&report.recent);
    }
}

/// Prints one line per session
pub fn print_sessions(sessions: &[SessionRecord]) {
    if sessions.is_empty() {
        println!("No sessions recorded.");
        return;
    }

    println!("Recent Sessions ({}):", sessions.len());
    for session in sessions {
        println!("  {}", format_session(session));
    }
}

fn format_session(session: &SessionRecord) -> String {
    format!(
        "#{} {} | {} URLs | {} ok / {} failed | seq {} | pool {} ({}) | bounded {} ({})",
        session.id,
        session.created_at,
        session.url_count,
        session.success_count,
        session.fail_count,
        format_seconds(session.sequential_time),
        format_seconds(session.pooled_time),
        format_speedup(session.speedup_pooled),
        format_seconds(session.bounded_time),
        format_speedup(session.speedup_bounded)
    )
}
