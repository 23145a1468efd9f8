//! Document indexing and ranking
//!
//! This module contains:
//! - Tokenization into unigram, bigram and trigram terms
//! - TF-IDF weighting and the inverted index
//! - Cosine-similarity ranking of documents against a query
//! - [`SearchEngine`], which ties the index to the document store

mod indexer;
mod ranker;
mod sequence;
mod tokenizer;

pub use indexer::{l2_norm, InvertedIndex, SparseVector, TermEntry, Weighting};
pub use ranker::{cosine_similarity, rank, round_score, RankedDocument};
pub use sequence::IdSequence;
pub use tokenizer::{ngrams, terms, tokenize, MAX_NGRAM};

use crate::config::IndexConfig;
use crate::storage::{Document, SqliteStorage, Storage};
use crate::SiftError;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Identifier of a corpus document
pub type DocumentId = i64;

/// Document corpus plus its current index
///
/// Rebuilding snapshots the documents under the store lock, replaces the
/// persisted terms and postings in one transaction, then swaps the
/// in-memory index. Readers keep whichever complete index they cloned.
pub struct SearchEngine {
    storage: Arc<Mutex<SqliteStorage>>,
    sequence: IdSequence,
    config: IndexConfig,
    index: RwLock<Option<Arc<InvertedIndex>>>,
}

impl SearchEngine {
    /// Creates an engine whose ids continue after the store's highest id
    pub fn new(storage: Arc<Mutex<SqliteStorage>>, config: IndexConfig) -> Result<Self, SiftError> {
        let sequence = {
            let guard = lock(&storage);
            IdSequence::after_store(&*guard)?
        };
        Ok(Self::with_sequence(storage, sequence, config))
    }

    /// Creates an engine with an explicit id sequence
    pub fn with_sequence(
        storage: Arc<Mutex<SqliteStorage>>,
        sequence: IdSequence,
        config: IndexConfig,
    ) -> Self {
        Self {
            storage,
            sequence,
            config,
            index: RwLock::new(None),
        }
    }

    /// Stores a new document and returns its id
    ///
    /// The index is not updated until the next [`SearchEngine::generate_index`].
    pub fn add_document(&self, content: &str) -> Result<DocumentId, SiftError> {
        let document = Document {
            id: self.sequence.next_id(),
            content: content.to_string(),
        };
        lock(&self.storage).insert_document(&document)?;
        tracing::debug!("Added document {}", document.id);
        Ok(document.id)
    }

    /// Rebuilds the index from every stored document
    pub fn generate_index(&self) -> Result<Arc<InvertedIndex>, SiftError> {
        let index = {
            let mut storage = lock(&self.storage);
            let documents = storage.list_documents()?;
            let index = InvertedIndex::build(
                documents.into_iter().map(|d| (d.id, d.content)),
                self.config.weighting,
            );
            storage.replace_index(&index.entries())?;
            Arc::new(index)
        };

        tracing::info!(
            "Index generated: {} documents, {} terms",
            index.document_count(),
            index.term_count()
        );

        let mut current = self
            .index
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some(Arc::clone(&index));
        Ok(index)
    }

    /// The current index, if one was generated
    pub fn index(&self) -> Option<Arc<InvertedIndex>> {
        self.index
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Ranks the corpus against `query`
    ///
    /// Generates the index first when none exists yet.
    pub fn rank(&self, query: &str) -> Result<Vec<RankedDocument>, SiftError> {
        let index = match self.index() {
            Some(index) => index,
            None => self.generate_index()?,
        };
        Ok(rank(&index, query, self.config.precision))
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }
}

fn lock(storage: &Mutex<SqliteStorage>) -> MutexGuard<'_, SqliteStorage> {
    storage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
