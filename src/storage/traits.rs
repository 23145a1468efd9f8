//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::Record;
use crate::index::{DocumentId, TermEntry};
use crate::storage::{Document, Page, RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    /// Returns true when the error is a unique-key violation
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every collection is keyed: pages by URL, records by email, documents by
/// id and terms by vocabulary id. Inserting an existing key where the
/// collection does not upsert yields [`StorageError::DuplicateKey`].
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its id
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and stamps its finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Counts runs
    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Pages =====

    /// Inserts a page or replaces the stored copy with the same URL
    fn upsert_page(&mut self, page: &Page, run_id: Option<i64>) -> StorageResult<()>;

    /// Gets a page by URL
    fn get_page(&self, url: &str) -> StorageResult<Option<Page>>;

    /// Lists every stored page URL in insertion order
    fn list_page_urls(&self) -> StorageResult<Vec<String>>;

    /// Removes every stored page
    fn clear_pages(&mut self) -> StorageResult<()>;

    /// Counts stored pages
    fn count_pages(&self) -> StorageResult<u64>;

    // ===== Records =====

    /// Inserts a record; an existing email is a [`StorageError::DuplicateKey`]
    fn insert_record(&mut self, record: &Record, source_url: Option<&str>) -> StorageResult<()>;

    /// Gets a record by email
    fn get_record(&self, email: &str) -> StorageResult<Option<Record>>;

    /// Lists records ordered by name
    fn list_records(&self) -> StorageResult<Vec<Record>>;

    /// Deletes a record, returning whether it existed
    fn delete_record(&mut self, email: &str) -> StorageResult<bool>;

    /// Counts stored records
    fn count_records(&self) -> StorageResult<u64>;

    // ===== Documents =====

    /// Inserts a document; an existing id is a [`StorageError::DuplicateKey`]
    fn insert_document(&mut self, document: &Document) -> StorageResult<()>;

    /// Replaces a document's content, returning whether it existed
    fn update_document(&mut self, id: DocumentId, content: &str) -> StorageResult<bool>;

    /// Deletes a document, returning whether it existed
    fn delete_document(&mut self, id: DocumentId) -> StorageResult<bool>;

    /// Gets a document by id
    fn get_document(&self, id: DocumentId) -> StorageResult<Option<Document>>;

    /// Lists every document in ascending id order
    fn list_documents(&self) -> StorageResult<Vec<Document>>;

    /// Highest document id ever stored, if any
    fn max_document_id(&self) -> StorageResult<Option<DocumentId>>;

    /// Removes every document
    fn clear_documents(&mut self) -> StorageResult<()>;

    /// Counts stored documents
    fn count_documents(&self) -> StorageResult<u64>;

    // ===== Inverted Index =====

    /// Replaces the whole vocabulary and postings in one transaction
    fn replace_index(&mut self, terms: &[TermEntry]) -> StorageResult<()>;

    /// Lists the vocabulary as (id, term) ordered by id
    fn list_terms(&self) -> StorageResult<Vec<(usize, String)>>;

    /// Gets the postings of one term
    fn get_postings(&self, term_id: usize) -> StorageResult<HashMap<DocumentId, f64>>;

    /// Counts vocabulary entries
    fn count_terms(&self) -> StorageResult<u64>;
}
