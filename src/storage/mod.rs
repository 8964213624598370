//! Storage module for persisting comparison sessions
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Session and per-URL result persistence
//! - Aggregate speedup statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::crawler::{Comparison, FetchResult, Strategy};
use serde::Serialize;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Persists a whole comparison: the session row plus every tagged result
///
/// Either everything is stored or nothing is.
///
/// # Returns
///
/// The generated session ID
pub fn save_comparison(storage: &mut dyn Storage, comparison: &Comparison) -> StorageResult<i64> {
    let session_id = storage.save_comparison(comparison)?;

    tracing::info!(
        "Crawl session saved with ID: {} ({} strategies)",
        session_id,
        comparison.summaries().count()
    );
    Ok(session_id)
}

/// Represents a comparison session in the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    pub url_count: u32,
    pub sequential_time: Option<f64>,
    pub pooled_time: Option<f64>,
    pub bounded_time: Option<f64>,
    pub success_count: u32,
    pub fail_count: u32,
    pub speedup_pooled: Option<f64>,
    pub speedup_bounded: Option<f64>,
    pub created_at: String,
}

/// Represents one stored per-URL result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResult {
    pub session_id: i64,
    pub strategy: Strategy,
    #[serde(flatten)]
    pub result: FetchResult,
}

/// Aggregates over every stored session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStatistics {
    pub total_sessions: u64,
    pub average_speedup_pooled: Option<f64>,
    pub average_speedup_bounded: Option<f64>,
}
