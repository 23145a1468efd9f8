//! Statistics generation from the database
//!
//! This module provides functionality for extracting and displaying
//! crawl and index statistics from the storage layer.

use crate::crawler::Record;
use crate::storage::{RunRecord, Storage};
use crate::url::extract_host;
use crate::SiftError;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Database statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Most recent crawl run
    pub latest_run: Option<RunRecord>,

    pub total_runs: u64,

    /// Number of stored pages
    pub total_pages: u64,

    /// Stored pages per host
    pub pages_by_host: BTreeMap<String, u64>,

    /// Stored records, ordered by name
    pub records: Vec<Record>,

    pub total_documents: u64,

    /// Vocabulary size of the last index build
    pub total_terms: u64,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, SiftError> {
    let mut pages_by_host = BTreeMap::new();
    for url in storage.list_page_urls()? {
        let host = extract_host(&url).unwrap_or_else(|| "(unknown)".to_string());
        *pages_by_host.entry(host).or_insert(0) += 1;
    }

    Ok(CrawlStatistics {
        latest_run: storage.get_latest_run()?,
        total_runs: storage.count_runs()?,
        total_pages: storage.count_pages()?,
        pages_by_host,
        records: storage.list_records()?,
        total_documents: storage.count_documents()?,
        total_terms: storage.count_terms()?,
    })
}

/// Renders statistics as the text shown by `print_statistics`
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_statistics(&mut out, stats);
    out
}

fn write_statistics(out: &mut String, stats: &CrawlStatistics) -> std::fmt::Result {
    writeln!(out, "=== Site-Sift Statistics ===\n")?;

    writeln!(out, "Crawl Runs: {}", stats.total_runs)?;
    if let Some(run) = &stats.latest_run {
        writeln!(out, "  Latest run: #{} ({})", run.id, run.status.to_db_string())?;
        writeln!(out, "  Started: {}", run.started_at)?;
        if let Some(finished) = &run.finished_at {
            writeln!(out, "  Finished: {}", finished)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "Pages: {}", stats.total_pages)?;
    for (host, count) in &stats.pages_by_host {
        writeln!(out, "  {}: {}", host, count)?;
    }
    writeln!(out)?;

    writeln!(out, "Records: {}", stats.records.len())?;
    for record in &stats.records {
        writeln!(out, "  - {} <{}>", record.name, record.email)?;
        for (label, value) in [
            ("Title", &record.title),
            ("Office", &record.office),
            ("Phone", &record.phone),
            ("Website", &record.website),
        ] {
            if let Some(value) = value {
                writeln!(out, "      {}: {}", label, value)?;
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "Index:")?;
    writeln!(out, "  Documents: {}", stats.total_documents)?;
    writeln!(out, "  Terms: {}", stats.total_terms)?;
    Ok(())
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
