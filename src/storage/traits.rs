//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::{Comparison, FetchResult, SessionSummary, Strategy};
use crate::storage::{SessionRecord, SessionStatistics, StoredResult};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The crawl engine never calls this; callers persist a finished
/// comparison through it.
pub trait Storage {
    // ===== Sessions =====

    /// Records a comparison's aggregate values
    ///
    /// # Returns
    ///
    /// The generated session ID
    fn save_session(&mut self, summary: &SessionSummary) -> StorageResult<i64>;

    /// Records the per-URL results one strategy produced for a session
    fn save_results(
        &mut self,
        session_id: i64,
        strategy: Strategy,
        results: &[FetchResult],
    ) -> StorageResult<()>;

    /// Records a whole comparison, session row and every run's results,
    /// atomically: on error nothing is stored
    ///
    /// # Returns
    ///
    /// The generated session ID
    fn save_comparison(&mut self, comparison: &Comparison) -> StorageResult<i64>;

    /// Gets a session by ID
    fn get_session(&self, session_id: i64) -> StorageResult<SessionRecord>;

    /// Gets the most recent sessions, newest first
    fn recent_sessions(&self, limit: usize) -> StorageResult<Vec<SessionRecord>>;

    // ===== Results =====

    /// Gets all results stored for a session, grouped by strategy in input order
    fn session_results(&self, session_id: i64) -> StorageResult<Vec<StoredResult>>;

    // ===== Statistics =====

    /// Aggregates over every stored session
    fn statistics(&self) -> StorageResult<SessionStatistics>;
}
