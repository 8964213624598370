//! Terminal report of a single comparison

use crate::crawler::{Comparison, RunSummary, Strategy};
use crate::output::{format_seconds, format_speedup};

/// Share of URLs that succeeded in the reporting run, as a percentage
pub fn success_rate(comparison: &Comparison) -> f64 {
    if comparison.url_count == 0 {
        return 0.0;
    }
    comparison.success_count as f64 / comparison.url_count as f64 * 100.0
}

/// Formats a comparison as a plain-text report
pub fn format_report(comparison: &Comparison) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Comparison ===\n\n");
    out.push_str(&format!("URLs: {}\n", comparison.url_count));
    out.push_str(&format!(
        "Success Rate: {:.1}% ({} succeeded, {} failed)\n\n",
        success_rate(comparison),
        comparison.success_count,
        comparison.fail_count
    ));

    out.push_str("Timings:\n");
    for strategy in Strategy::ALL {
        let elapsed = comparison.get(strategy).map(|run| run.elapsed_seconds);
        let line = match strategy {
            Strategy::Sequential => format!("  {:<14} {}\n", strategy.label(), format_seconds(elapsed)),
            _ => format!(
                "  {:<14} {} (speedup {})\n",
                strategy.label(),
                format_seconds(elapsed),
                format_speedup(comparison.speedup(strategy))
            ),
        };
        out.push_str(&line);
    }

    for run in comparison.summaries() {
        out.push('\n');
        out.push_str(&format_run(run));
    }

    out
}

fn format_run(run: &RunSummary) -> String {
    let mut out = format!(
        "{} ({} ok / {} failed):\n",
        run.strategy.label(),
        run.success_count(),
        run.fail_count()
    );

    for result in &run.results {
        let status = match (result.status_code, &result.error) {
            (Some(code), _) => code.to_string(),
            (None, Some(error)) => error.clone(),
            (None, None) => "-".to_string(),
        };
        out.push_str(&format!(
            "  {} | {} | {} links | {:.3}s | {}\n",
            result.url, result.title, result.link_count, result.response_time, status
        ));
    }

    out
}

/// Prints a comparison report to stdout
pub fn print_report(comparison: &Comparison) {
    print!("{}", format_report(comparison));
}
