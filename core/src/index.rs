use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;
pub type DocId = usize;

/// A cleaned corpus entry. `identity` is expected to be unique within the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub identity: String,
    pub text: String,
}

impl Document {
    pub fn new(identity: impl Into<String>, text: impl Into<String>) -> Self {
        Self { identity: identity.into(), text: text.into() }
    }
}

/// Term to index mapping. Terms are stored in index order, which is lexicographic after `fit`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    ids: HashMap<String, TermId>,
}

impl Vocabulary {
    pub(crate) fn from_ordered(terms: Vec<String>) -> Self {
        let ids = terms.iter().enumerate().map(|(i, t)| (t.clone(), i as TermId)).collect();
        Self { terms, ids }
    }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn get(&self, term: &str) -> Option<TermId> { self.ids.get(term).copied() }

    pub fn term(&self, id: TermId) -> Option<&str> { self.terms.get(id as usize).map(String::as_str) }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, &str)> {
        self.terms.iter().enumerate().map(|(i, t)| (i as TermId, t.as_str()))
    }
}

/// Weighted term vector of logical length `len()`, stored as non-zero entries sorted by term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentVector {
    dim: usize,
    entries: Vec<(TermId, f32)>,
}

impl DocumentVector {
    /// Builds an L2-normalized vector from raw term counts. A zero norm leaves the zero vector.
    pub(crate) fn from_counts(dim: usize, counts: HashMap<TermId, u32>, idf: &[f32], sublinear_tf: bool) -> Self {
        let mut weighted: Vec<(TermId, f64)> = counts
            .into_iter()
            .filter(|(_, c)| *c > 0)
            .map(|(tid, c)| {
                let tf = if sublinear_tf { 1.0 + (c as f64).ln() } else { c as f64 };
                (tid, tf * idf[tid as usize] as f64)
            })
            .collect();
        weighted.sort_by_key(|(tid, _)| *tid);

        let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        let scale = if norm > 0.0 { norm } else { 1.0 };
        let entries = weighted.into_iter().map(|(tid, w)| (tid, (w / scale) as f32)).collect();
        Self { dim, entries }
    }

    pub fn len(&self) -> usize { self.dim }

    pub fn is_empty(&self) -> bool { self.dim == 0 }

    /// Number of non-zero weights.
    pub fn nnz(&self) -> usize { self.entries.len() }

    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, term: TermId) -> f32 {
        self.entries
            .binary_search_by_key(&term, |(tid, _)| *tid)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f32)> + '_ { self.entries.iter().copied() }

    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dim];
        for (tid, w) in &self.entries { dense[*tid as usize] = *w; }
        dense
    }

    pub fn norm(&self) -> f32 { self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt() }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &Self) -> f32 {
        debug_assert_eq!(self.dim, other.dim, "vectors must share a vocabulary");
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f64;
        while i < self.entries.len() && j < other.entries.len() {
            let (ta, wa) = self.entries[i];
            let (tb, wb) = other.entries[j];
            match ta.cmp(&tb) {
                std::cmp::Ordering::Equal => {
                    sum += (wa as f64) * (wb as f64);
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        sum as f32
    }
}

/// Fitted corpus: vocabulary, idf weights and one vector per document, row-aligned with the input.
/// Immutable once built; a changed corpus needs a fresh fit.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    tokenizer: Tokenizer,
    sublinear_tf: bool,
    vocabulary: Vocabulary,
    idf: Vec<f32>,
    identities: Vec<String>,
    vectors: Vec<DocumentVector>,
}

impl CorpusIndex {
    pub(crate) fn new(
        tokenizer: Tokenizer,
        sublinear_tf: bool,
        vocabulary: Vocabulary,
        idf: Vec<f32>,
        identities: Vec<String>,
        vectors: Vec<DocumentVector>,
    ) -> Self {
        debug_assert_eq!(identities.len(), vectors.len());
        debug_assert_eq!(vocabulary.len(), idf.len());
        Self { tokenizer, sublinear_tf, vocabulary, idf, identities, vectors }
    }

    pub fn len(&self) -> usize { self.vectors.len() }

    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|tid| self.idf[tid as usize])
    }

    pub fn idf_weights(&self) -> &[f32] { &self.idf }

    pub fn vector(&self, row: DocId) -> Option<&DocumentVector> { self.vectors.get(row) }

    pub fn vectors(&self) -> &[DocumentVector] { &self.vectors }

    pub fn identity(&self, row: DocId) -> Option<&str> { self.identities.get(row).map(String::as_str) }

    pub fn identities(&self) -> &[String] { &self.identities }

    /// Weights `text` against the fitted vocabulary. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> DocumentVector {
        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for term in self.tokenizer.tokenize(text) {
            if let Some(tid) = self.vocabulary.get(&term) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        DocumentVector::from_counts(self.vocabulary.len(), counts, &self.idf, self.sublinear_tf)
    }
}
