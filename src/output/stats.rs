//! End-of-run statistics
//!
//! This module renders a `CrawlReport` for display once a crawl has been
//! finalized.

use crate::crawler::CrawlReport;
use std::fmt::Write;

/// Formats the report as an indented, human-readable summary
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Seed: {}", report.seed);
    let _ = writeln!(
        out,
        "  Started: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "  Duration: {:.1}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    let _ = writeln!(
        out,
        "  Status: {}",
        if report.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    );
    let _ = writeln!(out, "  URLs discovered: {}", report.urls_discovered);
    let _ = writeln!(out, "  Peak concurrent fetches: {}", report.peak_in_flight);
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Recorded: {}", report.pages_recorded);
    let _ = writeln!(out, "  Failed after retries: {}", report.pages_failed);
    let _ = writeln!(out, "  Skipped: {}", report.pages_skipped);
    let _ = writeln!(out, "  Retries: {}", report.retries);
    let _ = writeln!(out);

    let completed = report.pages_completed();
    let success_rate = if completed > 0 {
        (report.pages_recorded as f64 / completed as f64) * 100.0
    } else {
        0.0
    };
    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages recorded)",
        success_rate, report.pages_recorded, completed
    );

    out
}

/// Prints the report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
