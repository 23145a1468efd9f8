//! Storage module for persisting crawl and index data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Crawl run tracking
//! - Fetched pages and extracted records
//! - The document corpus and its inverted index

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::index::DocumentId;
use crate::SiftError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a storage database
///
/// This is the only storage failure that ends the process: without a store
/// nothing can be crawled or indexed.
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SiftError> {
    SqliteStorage::new(path)
}

/// A fetched markup page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub url: String,
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

impl Page {
    /// Creates a page stamped with the current time
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            fetched_at: Utc::now(),
        }
    }
}

/// A document of the indexed corpus
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub content: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Crawl still in progress (or interrupted without cleanup)
    Running,
    /// Frontier ran dry
    Completed,
    /// Frontier was stopped: target found, page limit hit or cancelled
    Stopped,
    /// Crawl ended with an error
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "stopped" => Some(Self::Stopped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
