//! Weighted n-gram inverted index
//!
//! Documents are turned into sparse term vectors (`HashMap<usize, f64>`
//! keyed by vocabulary id). The index keeps both directions: postings per
//! term for persistence, and one vector per document for ranking.

use crate::index::tokenizer::terms;
use crate::index::DocumentId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Sparse term-weight vector keyed by vocabulary id
pub type SparseVector = HashMap<usize, f64>;

/// Term weighting scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// `(count / total terms in doc) * log10(N / df)`
    #[default]
    Log10,
    /// `count * (ln((1 + N) / (1 + df)) + 1)`, L2-normalized per document
    Smooth,
}

impl Weighting {
    /// Inverse document frequency of a term found in `df` of `n` documents
    pub fn idf(&self, n: usize, df: usize) -> f64 {
        match self {
            Self::Log10 => {
                if df == 0 {
                    0.0
                } else {
                    (n as f64 / df as f64).log10()
                }
            }
            Self::Smooth => ((1.0 + n as f64) / (1.0 + df as f64)).ln() + 1.0,
        }
    }

    /// Weights term counts into a vector
    ///
    /// `total` is the number of n-gram occurrences the counts came from.
    fn weigh(&self, counts: &HashMap<usize, usize>, total: usize, idf: &[f64]) -> SparseVector {
        let mut vector: SparseVector = counts
            .iter()
            .map(|(&term, &count)| {
                let weight = match self {
                    Self::Log10 => (count as f64 / total as f64) * idf[term],
                    Self::Smooth => count as f64 * idf[term],
                };
                (term, weight)
            })
            .filter(|(_, weight)| *weight != 0.0)
            .collect();

        if *self == Self::Smooth {
            let norm = l2_norm(&vector);
            if norm > 0.0 {
                vector.values_mut().for_each(|w| *w /= norm);
            }
        }
        vector
    }
}

/// Euclidean length of a sparse vector
pub fn l2_norm(vector: &SparseVector) -> f64 {
    vector.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// One vocabulary entry with its postings
#[derive(Debug, Clone, PartialEq)]
pub struct TermEntry {
    pub id: usize,
    pub term: String,
    pub postings: HashMap<DocumentId, f64>,
}

/// An immutable index over one snapshot of the corpus
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    weighting: Weighting,
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
    postings: Vec<HashMap<DocumentId, f64>>,
    documents: BTreeMap<DocumentId, String>,
    vectors: BTreeMap<DocumentId, SparseVector>,
    norms: BTreeMap<DocumentId, f64>,
}

impl InvertedIndex {
    /// Builds the index over `(id, content)` pairs
    ///
    /// Documents are scanned in ascending id order and vocabulary ids follow
    /// first occurrence. Terms whose weight is zero in every document (a
    /// `log10` term present in all documents) are left out entirely.
    pub fn build<I, S>(documents: I, weighting: Weighting) -> Self
    where
        I: IntoIterator<Item = (DocumentId, S)>,
        S: Into<String>,
    {
        let documents: BTreeMap<DocumentId, String> = documents
            .into_iter()
            .map(|(id, content)| (id, content.into()))
            .collect();
        let n = documents.len();

        // First pass: provisional ids in first-seen order, counts and df
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut df: Vec<usize> = Vec::new();
        let mut counts: BTreeMap<DocumentId, (HashMap<usize, usize>, usize)> = BTreeMap::new();

        for (&id, content) in &documents {
            let doc_terms = terms(content);
            let total = doc_terms.len();
            let mut doc_counts: HashMap<usize, usize> = HashMap::new();

            for term in doc_terms {
                let provisional = match seen.get(&term) {
                    Some(&existing) => existing,
                    None => {
                        let next = order.len();
                        seen.insert(term.clone(), next);
                        order.push(term);
                        df.push(0);
                        next
                    }
                };
                *doc_counts.entry(provisional).or_insert(0) += 1;
            }

            for &term in doc_counts.keys() {
                df[term] += 1;
            }
            counts.insert(id, (doc_counts, total));
        }

        let provisional_idf: Vec<f64> = df.iter().map(|&d| weighting.idf(n, d)).collect();

        // Second pass: weights, then compact ids to terms with postings
        let provisional_vectors: BTreeMap<DocumentId, SparseVector> = counts
            .iter()
            .map(|(&id, (doc_counts, total))| {
                (id, weighting.weigh(doc_counts, *total, &provisional_idf))
            })
            .collect();

        let mut kept = vec![false; order.len()];
        for vector in provisional_vectors.values() {
            for &term in vector.keys() {
                kept[term] = true;
            }
        }

        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut vocabulary = HashMap::new();
        let mut final_terms = Vec::new();
        let mut idf = Vec::new();
        for (provisional, term) in order.into_iter().enumerate() {
            if kept[provisional] {
                let id = final_terms.len();
                remap.insert(provisional, id);
                vocabulary.insert(term.clone(), id);
                final_terms.push(term);
                idf.push(provisional_idf[provisional]);
            }
        }

        let mut postings: Vec<HashMap<DocumentId, f64>> = vec![HashMap::new(); final_terms.len()];
        let mut vectors = BTreeMap::new();
        let mut norms = BTreeMap::new();
        for (id, vector) in provisional_vectors {
            let vector: SparseVector = vector
                .into_iter()
                .filter_map(|(term, weight)| remap.get(&term).map(|&t| (t, weight)))
                .collect();
            for (&term, &weight) in &vector {
                postings[term].insert(id, weight);
            }
            norms.insert(id, l2_norm(&vector));
            vectors.insert(id, vector);
        }

        tracing::debug!(
            "Built index: {} documents, {} terms ({} zero-weight terms dropped)",
            n,
            final_terms.len(),
            kept.iter().filter(|k| !**k).count()
        );

        Self {
            weighting,
            vocabulary,
            terms: final_terms,
            idf,
            postings,
            documents,
            vectors,
            norms,
        }
    }

    /// Projects free text into the index's vector space
    ///
    /// Term frequencies are normalized by the text's total n-gram count.
    /// Terms outside the vocabulary contribute nothing.
    pub fn project(&self, text: &str) -> SparseVector {
        let text_terms = terms(text);
        let total = text_terms.len();
        if total == 0 {
            return SparseVector::new();
        }

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for term in &text_terms {
            if let Some(&id) = self.vocabulary.get(term) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        self.weighting.weigh(&counts, total, &self.idf)
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn term_id(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn term(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    /// Postings of a term, `None` when the term is not indexed
    pub fn postings(&self, term: &str) -> Option<&HashMap<DocumentId, f64>> {
        self.term_id(term).map(|id| &self.postings[id])
    }

    pub fn document(&self, id: DocumentId) -> Option<&str> {
        self.documents.get(&id).map(String::as_str)
    }

    pub fn vector(&self, id: DocumentId) -> Option<&SparseVector> {
        self.vectors.get(&id)
    }

    pub fn norm(&self, id: DocumentId) -> f64 {
        self.norms.get(&id).copied().unwrap_or(0.0)
    }

    /// Document ids in ascending order
    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    /// Vocabulary entries with their postings, ordered by id
    pub fn entries(&self) -> Vec<TermEntry> {
        self.terms
            .iter()
            .zip(&self.postings)
            .enumerate()
            .map(|(id, (term, postings))| TermEntry {
                id,
                term: term.clone(),
                postings: postings.clone(),
            })
            .collect()
    }
}
