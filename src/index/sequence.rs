//! Document id sequence

use crate::index::DocumentId;
use crate::storage::{Storage, StorageResult};
use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic document id generator
///
/// Ids are never handed out twice, even after the document holding one is
/// deleted.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicI64,
}

impl IdSequence {
    /// Starts the sequence at `first`
    pub fn starting_at(first: DocumentId) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Continues after the highest id already in the store, or starts at 1
    pub fn after_store<S: Storage + ?Sized>(storage: &S) -> StorageResult<Self> {
        let first = storage.max_document_id()?.map_or(1, |max| max + 1);
        Ok(Self::starting_at(first))
    }

    /// Takes the next id
    pub fn next_id(&self) -> DocumentId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// The id the next call will return
    pub fn peek(&self) -> DocumentId {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
