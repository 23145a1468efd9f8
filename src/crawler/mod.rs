//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The deduplicating URL frontier
//! - HTTP fetching and content-type validation
//! - HTML parsing and scoped link extraction
//! - Target page recognition and record extraction
//! - Per-host politeness and overall crawl coordination

mod classifier;
mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod parser;
mod throttle;

pub use classifier::TargetClassifier;
pub use coordinator::{run_crawl, Coordinator, CrawlReport, CrawlState};
pub use extractor::{
    normalize_label, Extraction, Record, RecordError, RecordExtractor, RejectedRecord, Segment,
};
pub use fetcher::{
    build_http_client, fetch_url, is_markup_content_type, user_agent_string, FetchResult,
    MAX_REDIRECTS,
};
pub use frontier::{Frontier, SharedFrontier};
pub use parser::extract_links;
pub use throttle::HostThrottle;
