//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::{Comparison, FetchResult, SessionSummary, Strategy};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{SessionRecord, SessionStatistics, StoredResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SESSION_COLUMNS: &str = "id, url_count, sequential_time, pooled_time, bounded_time,
     success_count, fail_count, speedup_pooled, speedup_bounded, created_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        url_count: row.get(1)?,
        sequential_time: row.get(2)?,
        pooled_time: row.get(3)?,
        bounded_time: row.get(4)?,
        success_count: row.get(5)?,
        fail_count: row.get(6)?,
        speedup_pooled: row.get(7)?,
        speedup_bounded: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn insert_session(conn: &Connection, summary: &SessionSummary) -> rusqlite::Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO crawl_sessions (url_count, sequential_time, pooled_time, bounded_time,
         success_count, fail_count, speedup_pooled, speedup_bounded, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            summary.url_count,
            summary.sequential_time,
            summary.pooled_time,
            summary.bounded_time,
            summary.success_count,
            summary.fail_count,
            summary.speedup_pooled,
            summary.speedup_bounded,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Inserts one strategy's results; the caller owns the transaction
fn insert_results(
    conn: &Connection,
    session_id: i64,
    strategy: Strategy,
    results: &[FetchResult],
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO crawl_results (session_id, strategy, position, url, title, link_count,
         status_code, error, response_time, success)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;

    for (position, result) in results.iter().enumerate() {
        stmt.execute(params![
            session_id,
            strategy.as_str(),
            position,
            result.url,
            result.title,
            result.link_count,
            result.status_code,
            result.error,
            result.response_time,
            result.success
        ])?;
    }

    tracing::debug!(
        "Saved {} {} results for session {}",
        results.len(),
        strategy,
        session_id
    );
    Ok(())
}

impl Storage for SqliteStorage {
    // ===== Sessions =====

    fn save_session(&mut self, summary: &SessionSummary) -> StorageResult<i64> {
        Ok(insert_session(&self.conn, summary)?)
    }

    fn save_results(
        &mut self,
        session_id: i64,
        strategy: Strategy,
        results: &[FetchResult],
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        insert_results(&tx, session_id, strategy, results)?;
        tx.commit()?;
        Ok(())
    }

    fn save_comparison(&mut self, comparison: &Comparison) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;
        let session_id = insert_session(&tx, &comparison.session_summary())?;
        for run in comparison.summaries() {
            insert_results(&tx, session_id, run.strategy, &run.results)?;
        }
        tx.commit()?;
        Ok(session_id)
    }

    fn get_session(&self, session_id: i64) -> StorageResult<SessionRecord> {
        let query = format!("SELECT {} FROM crawl_sessions WHERE id = ?1", SESSION_COLUMNS);
        self.conn
            .query_row(&query, params![session_id], session_from_row)
            .optional()?
            .ok_or(StorageError::SessionNotFound(session_id))
    }

    fn recent_sessions(&self, limit: usize) -> StorageResult<Vec<SessionRecord>> {
        let query = format!(
            "SELECT {} FROM crawl_sessions ORDER BY id DESC LIMIT ?1",
            SESSION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&query)?;

        let sessions = stmt
            .query_map(params![limit], session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    // ===== Results =====

    fn session_results(&self, session_id: i64) -> StorageResult<Vec<StoredResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT strategy, url, title, link_count, status_code, error, response_time, success
             FROM crawl_results WHERE session_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            let strategy: String = row.get(0)?;
            let result = FetchResult {
                url: row.get(1)?,
                title: row.get(2)?,
                link_count: row.get(3)?,
                status_code: row.get(4)?,
                error: row.get(5)?,
                response_time: row.get(6)?,
                success: row.get(7)?,
            };
            Ok((strategy, result))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (strategy, result) = row?;
            let strategy = strategy
                .parse::<Strategy>()
                .map_err(StorageError::Serialization)?;
            results.push(StoredResult {
                session_id,
                strategy,
                result,
            });
        }

        Ok(results)
    }

    // ===== Statistics =====

    fn statistics(&self) -> StorageResult<SessionStatistics> {
        let (total_sessions, avg_pooled, avg_bounded): (i64, Option<f64>, Option<f64>) =
            self.conn.query_row(
                "SELECT COUNT(*), AVG(speedup_pooled), AVG(speedup_bounded) FROM crawl_sessions",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        let round = |v: f64| (v * 100.0).round() / 100.0;

        Ok(SessionStatistics {
            total_sessions: total_sessions as u64,
            average_speedup_pooled: avg_pooled.map(round),
            average_speedup_bounded: avg_bounded.map(round),
        })
    }
}
