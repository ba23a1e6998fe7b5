use crate::error::{EngineError, Result};
use crate::index::{CorpusIndex, DocId, DocumentVector};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub row: DocId,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub row: DocId,
    pub identity: String,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy)]
enum IdentitySlot {
    Unique(DocId),
    Ambiguous,
}

/// Read-only k-NN view over a fitted [`CorpusIndex`].
///
/// Queries are brute force over every row. The handle is never mutated after `build`,
/// so it can be shared across threads (e.g. behind an `Arc`) without locking.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    index: CorpusIndex,
    by_identity: HashMap<String, IdentitySlot>,
}

// Rounding residue of a unit vector's self-dot stays well below this.
const DISTANCE_EPSILON: f32 = 1e-6;

/// Cosine distance between two unit (or zero) vectors, in [0, 2].
/// Distances under `DISTANCE_EPSILON` are reported as exactly 0.
pub fn cosine_distance(a: &DocumentVector, b: &DocumentVector) -> f32 {
    let distance = 1.0 - a.dot(b);
    if distance < DISTANCE_EPSILON {
        0.0
    } else {
        distance.min(2.0)
    }
}

fn by_distance_then_row(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance.total_cmp(&b.distance).then(a.row.cmp(&b.row))
}

/// Keeps the `k` best entries in ascending (distance, row) order.
fn top_k(mut scored: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, by_distance_then_row);
        scored.truncate(k);
    }
    scored.sort_by(by_distance_then_row);
    scored
}

impl SearchHandle {
    pub fn build(index: CorpusIndex) -> Self {
        let mut by_identity: HashMap<String, IdentitySlot> = HashMap::with_capacity(index.len());
        for (row, identity) in index.identities().iter().enumerate() {
            match by_identity.entry(identity.to_lowercase()) {
                Entry::Vacant(e) => {
                    e.insert(IdentitySlot::Unique(row));
                }
                Entry::Occupied(mut e) => {
                    tracing::warn!(identity = %identity, row, "identity collides case-insensitively with another document");
                    e.insert(IdentitySlot::Ambiguous);
                }
            }
        }
        Self { index, by_identity }
    }

    pub fn index(&self) -> &CorpusIndex { &self.index }

    pub fn len(&self) -> usize { self.index.len() }

    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    /// Resolves an identity to its row by case-insensitive exact match.
    pub fn resolve(&self, identity: &str) -> Result<DocId> {
        match self.by_identity.get(&identity.to_lowercase()) {
            Some(IdentitySlot::Unique(row)) => Ok(*row),
            Some(IdentitySlot::Ambiguous) => Err(EngineError::AmbiguousIdentity(identity.to_string())),
            None => Err(EngineError::DocumentNotFound(identity.to_string())),
        }
    }

    /// The `k` rows closest to `row`, excluding `row` itself.
    pub fn query(&self, row: DocId, k: usize) -> Result<Vec<Neighbor>> {
        let len = self.index.len();
        let target = self.index.vector(row).ok_or(EngineError::UnknownDocument { row, len })?;
        if k == 0 {
            return Err(EngineError::InvalidNeighborCount);
        }
        let available = len - 1;
        if k > available {
            return Err(EngineError::InsufficientNeighbors { requested: k, available });
        }

        let start = std::time::Instant::now();
        let scored: Vec<Neighbor> = self
            .index
            .vectors()
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != row)
            .map(|(other, v)| Neighbor { row: other, distance: cosine_distance(target, v) })
            .collect();
        let neighbors = top_k(scored, k);
        tracing::debug!(row, k, took_s = start.elapsed().as_secs_f64(), "query");
        Ok(neighbors)
    }

    pub fn query_by_identity(&self, identity: &str, k: usize) -> Result<Vec<Neighbor>> {
        let row = self.resolve(identity)?;
        self.query(row, k)
    }

    /// Neighbors of `identity` resolved back to identities, closest first.
    pub fn recommend(&self, identity: &str, k: usize) -> Result<Vec<Recommendation>> {
        let neighbors = self.query_by_identity(identity, k)?;
        Ok(self.resolve_neighbors(&neighbors))
    }

    /// The `k` rows closest to an arbitrary text weighted against the fitted vocabulary.
    pub fn query_text(&self, text: &str, k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(EngineError::InvalidNeighborCount);
        }
        let len = self.index.len();
        if k > len {
            return Err(EngineError::InsufficientNeighbors { requested: k, available: len });
        }
        let target = self.index.transform(text);
        let scored: Vec<Neighbor> = self
            .index
            .vectors()
            .iter()
            .enumerate()
            .map(|(row, v)| Neighbor { row, distance: cosine_distance(&target, v) })
            .collect();
        Ok(top_k(scored, k))
    }

    pub fn resolve_neighbors(&self, neighbors: &[Neighbor]) -> Vec<Recommendation> {
        neighbors
            .iter()
            .filter_map(|n| {
                self.index.identity(n.row).map(|identity| Recommendation {
                    row: n.row,
                    identity: identity.to_string(),
                    distance: n.distance,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(row: DocId, distance: f32) -> Neighbor { Neighbor { row, distance } }

    #[test]
    fn top_k_breaks_ties_by_row() {
        let scored = vec![n(4, 0.5), n(1, 0.2), n(3, 0.5), n(0, 0.9), n(2, 0.5)];
        let best = top_k(scored, 3);
        assert_eq!(best, vec![n(1, 0.2), n(2, 0.5), n(3, 0.5)]);
    }

    #[test]
    fn self_distance_is_exactly_zero() {
        let texts: Vec<String> = (1..60)
            .map(|i| (0..i % 7 + 1).map(|j| format!("term{} ", (i * 31 + j * 17) % 23)).collect())
            .collect();
        let docs: Vec<crate::Document> = texts.iter().enumerate().map(|(i, t)| crate::Document::new(format!("d{i}"), t.as_str())).collect();
        let index = crate::Vectorizer::default().fit(&docs).unwrap();
        for v in index.vectors() {
            assert_eq!(cosine_distance(v, v), 0.0);
        }
    }

    #[test]
    fn top_k_with_k_equal_len_sorts_everything() {
        let best = top_k(vec![n(1, 0.3), n(0, 0.3)], 2);
        assert_eq!(best, vec![n(0, 0.3), n(1, 0.3)]);
    }
}
