//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Site-Sift database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Fetched markup pages, upserted by URL
CREATE TABLE IF NOT EXISTS pages (
    url TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    run_id INTEGER REFERENCES runs(id)
);

-- Structured records extracted from the target page
CREATE TABLE IF NOT EXISTS records (
    email TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    title TEXT,
    office TEXT,
    phone TEXT,
    website TEXT,
    source_url TEXT,
    inserted_at TEXT NOT NULL
);

-- Indexed document corpus; ids come from the caller's sequence and
-- sqlite_sequence remembers the highest one ever inserted
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL
);

-- Vocabulary of the current index build
CREATE TABLE IF NOT EXISTS terms (
    id INTEGER PRIMARY KEY,
    term TEXT NOT NULL UNIQUE
);

-- Non-zero term weights per document
CREATE TABLE IF NOT EXISTS postings (
    term_id INTEGER NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
    document_id INTEGER NOT NULL,
    weight REAL NOT NULL,
    PRIMARY KEY (term_id, document_id)
);

CREATE INDEX IF NOT EXISTS idx_postings_document ON postings(document_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
