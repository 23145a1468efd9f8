//! Crawl report display

use crate::crawler::CrawlReport;

/// Renders a finished crawl's report
pub fn format_crawl_report(report: &CrawlReport) -> String {
    let mut lines = vec![
        "=== Crawl Report ===".to_string(),
        String::new(),
        format!("Run: #{} ({})", report.run_id, report.status.to_db_string()),
        format!("Elapsed: {:.1}s", report.elapsed.as_secs_f64()),
        String::new(),
        "Pages:".to_string(),
        format!("  Fetched: {}", report.pages_fetched),
        format!("  Stored: {}", report.pages_stored),
        format!("  Skipped: {}", report.pages_skipped),
        String::new(),
    ];

    match &report.target_url {
        Some(url) => {
            lines.push(format!("Target page: {}", url));
            lines.push(format!("  Records inserted: {}", report.records_inserted));
            lines.push(format!("  Already stored: {}", report.records_existing));
            lines.push(format!("  Rejected: {}", report.records_rejected));
        }
        None => lines.push("Target page: not found".to_string()),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Prints a crawl report to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    print!("{}", format_crawl_report(report));
}
