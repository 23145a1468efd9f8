//! Cosine-similarity ranking

use crate::index::indexer::{l2_norm, InvertedIndex, SparseVector};
use crate::index::DocumentId;
use std::cmp::Ordering;

/// A document matched by a query
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument {
    pub document_id: DocumentId,
    pub content: String,
    pub score: f64,
}

/// Cosine similarity of two sparse vectors; 0 when either is empty
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum();

    dot / (norm_a * norm_b)
}

/// Rounds to `precision` decimal digits
pub fn round_score(score: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (score * factor).round() / factor
}

/// Ranks every indexed document against `query`
///
/// Scores are rounded before filtering and sorting, so documents that only
/// differ past the configured precision tie and fall back to id order.
pub fn rank(index: &InvertedIndex, query: &str, precision: u32) -> Vec<RankedDocument> {
    let query_vector = index.project(query);
    let query_norm = l2_norm(&query_vector);
    if query_norm == 0.0 {
        tracing::debug!("Query '{}' has no indexed terms", query);
        return Vec::new();
    }

    let mut ranked: Vec<RankedDocument> = index
        .document_ids()
        .filter_map(|id| {
            let vector = index.vector(id)?;
            let score = round_score(
                cosine_similarity(&query_vector, vector, query_norm, index.norm(id)),
                precision,
            );
            if score > 0.0 {
                Some(RankedDocument {
                    document_id: id,
                    content: index.document(id).unwrap_or_default().to_string(),
                    score,
                })
            } else {
                None
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.document_id.cmp(&b.document_id))
    });
    ranked
}
