//! Exact k-nearest-neighbor search over the scaled feature matrix.

use crate::error::{Error, Result};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A brute-force neighbor index over all dataset rows, in scaled feature
/// space. Vector position equals dataset row index, so search hits can be
/// dereferenced directly against the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborIndex {
    vectors: Vec<Vec<f64>>,
}

/// One search hit: dataset row index and Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborHit {
    pub index: usize,
    pub distance: f64,
}

impl NeighborIndex {
    /// Build from scaled row vectors, one per dataset row.
    pub fn fit(vectors: Vec<Vec<f64>>) -> Result<Self> {
        if vectors.is_empty() {
            return Err(Error::Internal("cannot index zero vectors".into()));
        }
        let dim = vectors[0].len();
        if vectors.iter().any(|v| v.len() != dim) {
            return Err(Error::Internal("inconsistent vector dimensions".into()));
        }
        Ok(Self { vectors })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    /// The `k` nearest rows to a scaled query vector, ascending by
    /// distance with row index as the tie-break. Asking for more rows than
    /// exist returns everything.
    pub fn search(&self, query: &[f64], k: usize) -> Result<Vec<NeighborHit>> {
        if query.len() != self.dim() {
            return Err(Error::Internal(format!(
                "index built on {} dims, query has {}",
                self.dim(),
                query.len()
            )));
        }

        let mut hits: Vec<NeighborHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| NeighborHit {
                index,
                distance: euclidean(query, v),
            })
            .collect();

        hits.sort_unstable_by_key(|h| (OrderedFloat(h.distance), h.index));
        hits.truncate(k);
        Ok(hits)
    }
}

/// Euclidean distance between two equal-length vectors.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Distance-to-similarity transform, monotonically decreasing and bounded
/// in (0, 1] for non-negative distances.
#[inline]
#[must_use]
pub fn similarity_score(distance: f64) -> f64 {
    1.0 / (1.0 + distance)
}
