//! HTML rendering of a comparison
//!
//! Produces the single page served at the web root: a timing overview
//! followed by one result table per strategy that ran.

use crate::crawler::{Comparison, RunSummary, Strategy};
use crate::output::report::success_rate;
use crate::output::{format_seconds, format_speedup};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Renders a comparison as a complete HTML document
///
/// # Arguments
///
/// * `comparison` - The comparison to render; strategies that did not run are shown as n/a
/// * `session_id` - ID under which the comparison was stored, if it was
pub fn render_index(comparison: &Comparison, session_id: Option<i64>) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>Crawl Comparison</title>\n");
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Crawl Comparison</h1>\n");

    // Overview
    html.push_str("<section class=\"overview\">\n<ul>\n");
    html.push_str(&format!("<li><strong>URLs</strong>: {}</li>\n", comparison.url_count));
    html.push_str(&format!(
        "<li><strong>Succeeded</strong>: {}</li>\n",
        comparison.success_count
    ));
    html.push_str(&format!(
        "<li><strong>Failed</strong>: {}</li>\n",
        comparison.fail_count
    ));
    html.push_str(&format!(
        "<li><strong>Success Rate</strong>: {:.1}%</li>\n",
        success_rate(comparison)
    ));
    if let Some(id) = session_id {
        html.push_str(&format!("<li><strong>Session</strong>: #{}</li>\n", id));
    }
    html.push_str("</ul>\n</section>\n");

    // Timings
    html.push_str("<h2>Timings</h2>\n<table class=\"timings\">\n");
    html.push_str("<tr><th>Strategy</th><th>Elapsed</th><th>Speedup</th></tr>\n");
    for strategy in Strategy::ALL {
        let elapsed = comparison.get(strategy).map(|run| run.elapsed_seconds);
        let speedup = match strategy {
            Strategy::Sequential => elapsed.map(|_| 1.0),
            _ => comparison.speedup(strategy),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            strategy.label(),
            format_seconds(elapsed),
            format_speedup(speedup)
        ));
    }
    html.push_str("</table>\n");

    if comparison.summaries().next().is_none() {
        html.push_str("<p class=\"empty\">No strategy produced results.</p>\n");
    }

    for run in comparison.summaries() {
        html.push_str(&render_run(run));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_run(run: &RunSummary) -> String {
    let mut html = format!(
        "<h2>{} <small>({} ok / {} failed)</small></h2>\n",
        run.strategy.label(),
        run.success_count(),
        run.fail_count()
    );

    if run.results.is_empty() {
        html.push_str("<p class=\"empty\">No URLs.</p>\n");
        return html;
    }

    html.push_str("<table class=\"results\">\n");
    html.push_str(
        "<tr><th>URL</th><th>Title</th><th>Links</th><th>Status</th><th>Time</th><th>Error</th></tr>\n",
    );
    for result in &run.results {
        let class = if result.success { "ok" } else { "failed" };
        let status = result
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string());
        html.push_str(&format!(
            "<tr class=\"{}\"><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{:.3}s</td><td>{}</td></tr>\n",
            class,
            encode_double_quoted_attribute(&result.url),
            encode_text(&result.url),
            encode_text(&result.title),
            result.link_count,
            status,
            result.response_time,
            encode_text(result.error.as_deref().unwrap_or(""))
        ));
    }
    html.push_str("</table>\n");

    html
}

const STYLE: &str = "<style>
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; margin-bottom: 1.5em; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }
tr.failed { background: #fbeaea; }
.empty { color: #777; }
</style>
";
