//! Append-only exact nearest-neighbor index over embedding vectors.

use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// In-memory collection of fixed-width vectors with brute-force
/// squared-L2 search. Entries are addressed by insertion position; the
/// chunk at the same position in the corpus store is the entry's text.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

/// A single nearest-neighbor match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Insertion position of the matched vector.
    pub position: usize,
    /// Squared L2 distance to the query vector.
    pub distance: f32,
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append vectors in order. Every vector is width-checked before any is
    /// stored, so a failed append leaves the index untouched.
    pub fn append(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), RetrievalError> {
        for v in &vectors {
            if v.len() != self.dim {
                return Err(RetrievalError::DimensionMismatch {
                    expected: self.dim,
                    actual: v.len(),
                });
            }
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Return the `k` entries closest to `query`, ascending by squared L2
    /// distance. The sort is stable, so equal distances keep insertion
    /// order. An empty index (or a query of the wrong width) yields an
    /// empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if query.len() != self.dim {
            return Vec::new();
        }

        let mut scored: Vec<SearchHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| SearchHit {
                position,
                distance: l2_distance_sq(query, v),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }
}

fn l2_distance_sq(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for i in 0..a.len() {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::new(3);
        assert!(index.search(&[0.0, 0.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_search_orders_by_distance() {
        let mut index = VectorIndex::new(2);
        index
            .append(vec![vec![10.0, 10.0], vec![1.0, 1.0], vec![5.0, 5.0]])
            .unwrap();

        let hits = index.search(&[0.0, 0.0], 3);
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let mut index = VectorIndex::new(2);
        index
            .append(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]])
            .unwrap();

        let hits = index.search(&[0.0, 0.0], 3);
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_caps_k_at_len() {
        let mut index = VectorIndex::new(1);
        index.append(vec![vec![1.0], vec![2.0]]).unwrap();
        assert_eq!(index.search(&[0.0], 10).len(), 2);
    }

    #[test]
    fn test_append_rejects_wrong_dimension() {
        let mut index = VectorIndex::new(3);
        let err = index
            .append(vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]])
            .unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        // Nothing was stored, including the valid leading vector.
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_wrong_width_query() {
        let mut index = VectorIndex::new(3);
        index.append(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(index.search(&[1.0, 2.0], 1).is_empty());
    }

    #[test]
    fn test_l2_distance() {
        assert_eq!(l2_distance_sq(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(l2_distance_sq(&[1.0], &[1.0]), 0.0);
    }
}
