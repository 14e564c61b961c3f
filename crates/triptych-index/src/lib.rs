//! Exact flat similarity index over squared L2 distance.
//!
//! This crate provides a brute-force k-nearest-neighbour index for
//! fixed-dimension embedding vectors. Positions are assigned in insertion
//! order and stay stable until [`FlatL2Index::clear`]; the index is
//! append-only in between.
//!
//! # Example
//!
//! ```rust
//! use triptych_index::FlatL2Index;
//!
//! let mut index = FlatL2Index::new(2);
//! index.add(&[vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
//!
//! let (distances, indices) = index.search(&[0.0, 0.0], 1).unwrap();
//! assert_eq!(indices[0], 0);
//! assert!(distances[0] < 1e-6);
//! ```

use thiserror::Error;

/// Sentinel position for result slots that could not be filled because the
/// index holds fewer vectors than requested.
pub const NO_MATCH: i64 = -1;

/// Index-related errors.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Exact k-NN index using brute-force search over squared L2 distance.
///
/// Distances are squared (no final square root); callers that only rank by
/// distance get the same ordering either way.
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Vector dimension this index accepts.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append vectors to the index, preserving order.
    ///
    /// The position of each vector becomes its result index in
    /// [`FlatL2Index::search`].
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> IndexResult<()> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        self.vectors.extend(vectors.iter().cloned());
        Ok(())
    }

    /// Drop all stored vectors. Positions restart at zero afterwards.
    pub fn clear(&mut self) {
        self.vectors.clear();
    }

    /// Find the `k` nearest vectors to `query`.
    ///
    /// Returns exactly `k` (distance, position) slots in ascending distance
    /// order. When fewer than `k` vectors are stored, the remaining slots are
    /// padded with infinite distance and [`NO_MATCH`]. Equidistant vectors
    /// rank in insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> IndexResult<(Vec<f32>, Vec<i64>)> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(f32, i64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (squared_l2(query, v), i as i64))
            .collect();

        // Stable sort keeps insertion order for equal distances
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        while scored.len() < k {
            scored.push((f32::INFINITY, NO_MATCH));
        }

        Ok(scored.into_iter().unzip())
    }
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_orders_by_distance() {
        let mut index = FlatL2Index::new(2);
        index
            .add(&[vec![10.0, 0.0], vec![1.0, 0.0], vec![5.0, 0.0]])
            .unwrap();

        let (distances, indices) = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(indices, vec![1, 2, 0]);
        assert!(distances[0] < distances[1]);
        assert!(distances[1] < distances[2]);
    }

    #[test]
    fn test_search_pads_with_sentinel() {
        let mut index = FlatL2Index::new(2);
        index.add(&[vec![1.0, 1.0]]).unwrap();

        let (distances, indices) = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(indices, vec![0, NO_MATCH, NO_MATCH]);
        assert!(distances[1].is_infinite());
        assert!(distances[2].is_infinite());
    }

    #[test]
    fn test_empty_index_returns_all_sentinels() {
        let index = FlatL2Index::new(4);
        let (_, indices) = index.search(&[0.0; 4], 2).unwrap();
        assert_eq!(indices, vec![NO_MATCH, NO_MATCH]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = FlatL2Index::new(1);
        index.add(&[vec![1.0], vec![-1.0], vec![1.0]]).unwrap();

        let (_, indices) = index.search(&[0.0], 3).unwrap();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_distances_are_squared() {
        let mut index = FlatL2Index::new(2);
        index.add(&[vec![3.0, 4.0]]).unwrap();

        let (distances, _) = index.search(&[0.0, 0.0], 1).unwrap();
        assert!((distances[0] - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let mut index = FlatL2Index::new(3);
        let result = index.add(&[vec![1.0, 0.0]]);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let index = FlatL2Index::new(3);
        let result = index.search(&[1.0, 0.0], 1);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_clear_resets_positions() {
        let mut index = FlatL2Index::new(1);
        index.add(&[vec![5.0], vec![6.0]]).unwrap();
        index.clear();
        assert!(index.is_empty());

        index.add(&[vec![7.0]]).unwrap();
        let (_, indices) = index.search(&[7.0], 1).unwrap();
        assert_eq!(indices, vec![0]);
    }
}
