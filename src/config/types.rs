use serde::Deserialize;

use crate::index::Weighting;

/// Main configuration structure for Site-Sift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub target: TargetConfig,
    #[serde(default)]
    pub index: IndexConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URLs the frontier is seeded with
    pub seeds: Vec<String>,

    /// Prefix every followed URL must start with
    pub scope: String,

    /// Path suffixes treated as crawlable documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Number of concurrent crawl workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Upper bound on visited URLs (unbounded when absent)
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<usize>,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "request-delay-ms", default)]
    pub request_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Target page recognition and record layout
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Selector for the heading that identifies the target page
    #[serde(rename = "heading-selector")]
    pub heading_selector: String,

    /// Exact (trimmed) heading text of the target page
    #[serde(rename = "heading-text")]
    pub heading_text: String,

    /// Selector for the elements holding the records
    #[serde(rename = "record-container", default = "default_record_container")]
    pub record_container: String,

    /// Tag of the heading that opens a record (its text is the name)
    #[serde(rename = "record-heading", default = "default_record_heading")]
    pub record_heading: String,

    /// Tag of the sibling block carrying the record fields
    #[serde(rename = "record-block", default = "default_record_block")]
    pub record_block: String,

    /// Tag of the bold leader that labels each field
    #[serde(rename = "field-leader", default = "default_field_leader")]
    pub field_leader: String,
}

/// Indexing and ranking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Term weighting scheme
    #[serde(default)]
    pub weighting: Weighting,

    /// Decimal digits kept in ranking scores
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            weighting: Weighting::default(),
            precision: default_precision(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_extensions() -> Vec<String> {
    vec![".html".to_string(), ".shtml".to_string(), ".htm".to_string()]
}

fn default_workers() -> u32 {
    1
}

fn default_timeout() -> u64 {
    30
}

fn default_record_container() -> String {
    "section.text-images".to_string()
}

fn default_record_heading() -> String {
    "h2".to_string()
}

fn default_record_block() -> String {
    "p".to_string()
}

fn default_field_leader() -> String {
    "strong".to_string()
}

fn default_precision() -> u32 {
    2
}
