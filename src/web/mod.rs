//! HTTP front end
//!
//! Serves the comparison page and a small JSON API over stored sessions.
//! Comparisons and database access run on blocking threads; the handlers
//! themselves never block the server runtime.

use crate::config::AppConfig;
use crate::crawler::{compare, Comparison};
use crate::output::render_index;
use crate::storage::{
    save_comparison, SessionRecord, SessionStatistics, SqliteStorage, Storage, StorageError,
    StorageResult, StoredResult,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

/// Default number of sessions returned by `/api/sessions`
pub const DEFAULT_SESSION_LIMIT: usize = 10;
/// Upper bound on `/api/sessions?limit=`
pub const MAX_SESSION_LIMIT: usize = 100;

/// Storage handle shared between requests
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    urls: Arc<Vec<String>>,
    storage: Option<SharedStorage>,
}

impl AppState {
    /// Creates handler state
    ///
    /// Without `storage`, comparisons are not persisted and the read
    /// endpoints return empty data.
    pub fn new(config: AppConfig, urls: Vec<String>, storage: Option<SqliteStorage>) -> Self {
        Self {
            config: Arc::new(config),
            urls: Arc::new(urls),
            storage: storage.map(|s| Arc::new(Mutex::new(s))),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Default, Deserialize)]
pub struct SessionsQuery {
    limit: Option<usize>,
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/sessions", get(sessions))
        .route("/api/sessions/:id/results", get(session_results))
        .route("/api/statistics", get(statistics))
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> crate::Result<()> {
    tracing::info!(
        "Serving {} URLs on http://{} (storage {})",
        state.urls.len(),
        addr,
        if state.storage.is_some() { "enabled" } else { "disabled" }
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Runs a fresh comparison and renders it
async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let config = Arc::clone(&state.config);
    let urls = Arc::clone(&state.urls);
    let storage = state.storage.clone();

    let (comparison, session_id) = tokio::task::spawn_blocking(move || {
        let comparison = compare(&urls, &config.crawler);
        let session_id = storage.and_then(|storage| persist(&storage, &comparison));
        (comparison, session_id)
    })
    .await
    .map_err(|err| internal_error(format!("comparison task join error: {err}")))?;

    Ok(Html(render_index(&comparison, session_id)))
}

/// Stores a comparison, logging instead of failing the request
fn persist(storage: &SharedStorage, comparison: &Comparison) -> Option<i64> {
    let mut guard = storage.lock().unwrap_or_else(PoisonError::into_inner);
    match save_comparison(&mut *guard, comparison) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!("Failed to persist comparison: {}", e);
            None
        }
    }
}

async fn sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SESSION_LIMIT)
        .clamp(1, MAX_SESSION_LIMIT);

    match state.storage {
        Some(storage) => read(storage, move |s| s.recent_sessions(limit)).await.map(Json),
        None => Ok(Json(Vec::new())),
    }
}

async fn session_results(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<Vec<StoredResult>>, ApiError> {
    match state.storage {
        Some(storage) => read(storage, move |s| {
            s.get_session(session_id)?;
            s.session_results(session_id)
        })
        .await
        .map(Json),
        None => Ok(Json(Vec::new())),
    }
}

async fn statistics(State(state): State<AppState>) -> Result<Json<SessionStatistics>, ApiError> {
    match state.storage {
        Some(storage) => read(storage, |s| s.statistics()).await.map(Json),
        None => Ok(Json(SessionStatistics::default())),
    }
}

/// Runs a storage query on a blocking thread
async fn read<T, F>(storage: SharedStorage, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SqliteStorage) -> StorageResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let guard = storage.lock().unwrap_or_else(PoisonError::into_inner);
        query(&*guard)
    })
    .await
    .map_err(|err| internal_error(format!("storage task join error: {err}")))?
    .map_err(storage_error)
}

fn storage_error(err: StorageError) -> ApiError {
    match err {
        StorageError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                message: err.to_string(),
            }),
        ),
        other => {
            tracing::error!("Storage query failed: {}", other);
            internal_error(other.to_string())
        }
    }
}

fn internal_error(message: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}
