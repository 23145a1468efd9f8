//! Output module for reports and statistics
//!
//! This module handles:
//! - Printing the report of a finished crawl
//! - Loading and printing database statistics
//! - Printing ranked search results

mod ranking;
mod report;
pub mod stats;

pub use ranking::{format_ranked, print_ranking};
pub use report::{format_crawl_report, print_crawl_report};
pub use stats::{format_statistics, load_statistics, print_statistics, CrawlStatistics};
