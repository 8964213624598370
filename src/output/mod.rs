//! Output module for presenting comparison results
//!
//! This module handles:
//! - Terminal reports of a single comparison
//! - The HTML page served at the web root
//! - Aggregate statistics over stored sessions

mod html;
mod report;
pub mod stats;

pub use html::render_index;
pub use report::{format_report, print_report, success_rate};
pub use stats::{load_statistics, print_sessions, print_statistics, StatisticsReport};

/// Formats an optional number of seconds for display
pub(crate) fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(seconds) => format!("{:.2}s", seconds),
        None => "n/a".to_string(),
    }
}

/// Formats an optional speedup ratio for display
pub(crate) fn format_speedup(value: Option<f64>) -> String {
    match value {
        Some(ratio) => format!("{:.2}x", ratio),
        None => "n/a".to_string(),
    }
}
