//! Result records produced by the crawl engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Title recorded when a page has no usable `<title>`
pub const NO_TITLE: &str = "No Title";
/// Title recorded after every attempt timed out
pub const TIMEOUT_TITLE: &str = "Timeout Error";
/// Title recorded after every attempt failed to connect
pub const CONNECTION_TITLE: &str = "Connection Error";
/// Title recorded for any other failure
pub const ERROR_TITLE: &str = "Error";

/// Longest error message kept on a result, in characters
pub const MAX_ERROR_LEN: usize = 100;
/// Longest underlying connection message kept, in characters
pub const MAX_CONNECTION_DETAIL_LEN: usize = 50;

/// Outcome of fetching a single URL, including any retries
///
/// A result is either successful (`success == true`, `error == None`) or
/// failed (`success == false`, `error == Some(..)`); the constructors below
/// are the only way this crate builds one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// The requested URL, populated even on failure
    pub url: String,

    /// Page title, or one of the sentinel titles on failure
    pub title: String,

    /// Number of `<a>` elements carrying an `href`
    pub link_count: u32,

    /// HTTP status, if a response was received
    pub status_code: Option<u16>,

    /// Human-readable failure reason, at most [`MAX_ERROR_LEN`] characters
    pub error: Option<String>,

    /// Wall-clock duration of the fetch in seconds, millisecond precision
    pub response_time: f64,

    pub success: bool,
}

impl FetchResult {
    pub fn success(
        url: impl Into<String>,
        title: impl Into<String>,
        link_count: u32,
        status_code: u16,
        elapsed: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            link_count,
            status_code: Some(status_code),
            error: None,
            response_time: round_millis(elapsed),
            success: true,
        }
    }

    pub fn timed_out(url: impl Into<String>, elapsed: Duration) -> Self {
        Self::failure(url, TIMEOUT_TITLE, "Request timed out", elapsed)
    }

    pub fn connection_failed(url: impl Into<String>, detail: &str, elapsed: Duration) -> Self {
        let error = format!(
            "Connection failed: {}",
            truncate_chars(detail, MAX_CONNECTION_DETAIL_LEN)
        );
        Self::failure(url, CONNECTION_TITLE, &error, elapsed)
    }

    pub fn errored(url: impl Into<String>, message: &str, elapsed: Duration) -> Self {
        Self::failure(url, ERROR_TITLE, message, elapsed)
    }

    fn failure(url: impl Into<String>, title: &str, error: &str, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            title: title.to_string(),
            link_count: 0,
            status_code: None,
            error: Some(truncate_chars(error, MAX_ERROR_LEN)),
            response_time: round_millis(elapsed),
            success: false,
        }
    }
}

/// Ordered results of one strategy over a URL list, plus its wall-clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub strategy: Strategy,

    /// One result per input URL, in input order
    pub results: Vec<FetchResult>,

    /// Wall-clock time of the whole run in seconds
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn new(strategy: Strategy, results: Vec<FetchResult>, elapsed: Duration) -> Self {
        Self {
            strategy,
            results,
            elapsed_seconds: round_centis(elapsed),
        }
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn fail_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}

/// One of the three orchestration disciplines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Sequential,
    Pooled,
    Bounded,
}

impl Strategy {
    /// Every strategy, in the order a comparison runs them
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Pooled, Strategy::Bounded];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Pooled => "pooled",
            Self::Bounded => "bounded",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Pooled => "Thread pool",
            Self::Bounded => "Bounded async",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "pooled" => Ok(Self::Pooled),
            "bounded" => Ok(Self::Bounded),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Truncates `s` to at most `max` characters without splitting a code point
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

fn round_centis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
