//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::Record;
use crate::index::{DocumentId, TermEntry};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Document, Page, RunRecord, RunStatus};
use crate::SiftError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and initializes the schema
    pub fn new(path: &Path) -> Result<Self, SiftError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SiftError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Maps a unique-constraint failure to [`StorageError::DuplicateKey`]
fn duplicate_or(err: rusqlite::Error, key: &str) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::ConstraintViolation => {
            StorageError::DuplicateKey(key.to_string())
        }
        other => StorageError::Sqlite(other),
    }
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        email: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        office: row.get(3)?,
        phone: row.get(4)?,
        website: row.get(5)?,
    })
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status";
const RECORD_COLUMNS: &str = "email, name, title, office, phone, website";

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Pages =====

    fn upsert_page(&mut self, page: &Page, run_id: Option<i64>) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO pages (url, content, fetched_at, run_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET
                content = excluded.content,
                fetched_at = excluded.fetched_at,
                run_id = excluded.run_id",
            params![page.url, page.content, page.fetched_at.to_rfc3339(), run_id],
        )?;
        Ok(())
    }

    fn get_page(&self, url: &str) -> StorageResult<Option<Page>> {
        let page = self
            .conn
            .query_row(
                "SELECT url, content, fetched_at FROM pages WHERE url = ?1",
                params![url],
                |row| {
                    Ok(Page {
                        url: row.get(0)?,
                        content: row.get(1)?,
                        fetched_at: parse_timestamp(2, row.get(2)?)?,
                    })
                },
            )
            .optional()?;
        Ok(page)
    }

    fn list_page_urls(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM pages ORDER BY rowid")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    fn clear_pages(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM pages", [])?;
        Ok(())
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Records =====

    fn insert_record(&mut self, record: &Record, source_url: Option<&str>) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO records (email, name, title, office, phone, website, source_url, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.email,
                    record.name,
                    record.title,
                    record.office,
                    record.phone,
                    record.website,
                    source_url,
                    now
                ],
            )
            .map_err(|e| duplicate_or(e, &record.email))?;
        Ok(())
    }

    fn get_record(&self, email: &str) -> StorageResult<Option<Record>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM records WHERE email = ?1", RECORD_COLUMNS),
                params![email],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn list_records(&self) -> StorageResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM records ORDER BY name, email",
            RECORD_COLUMNS
        ))?;
        let records = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn delete_record(&mut self, email: &str) -> StorageResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM records WHERE email = ?1", params![email])?;
        Ok(deleted > 0)
    }

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Documents =====

    fn insert_document(&mut self, document: &Document) -> StorageResult<()> {
        self.conn
            .execute(
                "INSERT INTO documents (id, content) VALUES (?1, ?2)",
                params![document.id, document.content],
            )
            .map_err(|e| duplicate_or(e, &format!("document {}", document.id)))?;
        Ok(())
    }

    fn update_document(&mut self, id: DocumentId, content: &str) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE documents SET content = ?1 WHERE id = ?2",
            params![content, id],
        )?;
        Ok(updated > 0)
    }

    fn delete_document(&mut self, id: DocumentId) -> StorageResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn get_document(&self, id: DocumentId) -> StorageResult<Option<Document>> {
        let document = self
            .conn
            .query_row(
                "SELECT id, content FROM documents WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Document {
                        id: row.get(0)?,
                        content: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(document)
    }

    fn list_documents(&self) -> StorageResult<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, content FROM documents ORDER BY id")?;
        let documents = stmt
            .query_map([], |row| {
                Ok(Document {
                    id: row.get(0)?,
                    content: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }

    fn max_document_id(&self) -> StorageResult<Option<DocumentId>> {
        let max: DocumentId = self.conn.query_row(
            "SELECT MAX(
                COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'documents'), 0),
                COALESCE((SELECT MAX(id) FROM documents), 0))",
            [],
            |row| row.get(0),
        )?;
        Ok(if max > 0 { Some(max) } else { None })
    }

    fn clear_documents(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM documents", [])?;
        Ok(())
    }

    fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Inverted Index =====

    fn replace_index(&mut self, terms: &[TermEntry]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM postings", [])?;
        tx.execute("DELETE FROM terms", [])?;
        {
            let mut insert_term = tx.prepare("INSERT INTO terms (id, term) VALUES (?1, ?2)")?;
            let mut insert_posting = tx.prepare(
                "INSERT INTO postings (term_id, document_id, weight) VALUES (?1, ?2, ?3)",
            )?;

            for entry in terms {
                insert_term
                    .execute(params![entry.id as i64, entry.term])
                    .map_err(|e| duplicate_or(e, &entry.term))?;
                for (document_id, weight) in &entry.postings {
                    insert_posting.execute(params![entry.id as i64, document_id, weight])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn list_terms(&self) -> StorageResult<Vec<(usize, String)>> {
        let mut stmt = self.conn.prepare("SELECT id, term FROM terms ORDER BY id")?;
        let terms = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)? as usize, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(terms)
    }

    fn get_postings(&self, term_id: usize) -> StorageResult<HashMap<DocumentId, f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT document_id, weight FROM postings WHERE term_id = ?1")?;
        let postings = stmt
            .query_map(params![term_id as i64], |row| {
                Ok((row.get::<_, DocumentId>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(postings)
    }

    fn count_terms(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM terms", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
