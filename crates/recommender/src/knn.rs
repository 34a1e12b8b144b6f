//! Brute-force cosine k-nearest-neighbors over sparse matrix rows.
//!
//! There is no approximation structure and nothing learned at fit time:
//! fitting stores the matrix and per-row norms, and every query is an
//! exhaustive distance sweep against all indexed rows. Cosine distance is
//! `1 - cosine similarity`, so lower means more similar and a row is always
//! at distance zero from itself.

use crate::error::{RecommendError, Result};
use rayon::prelude::*;
use sprs::CsMat;
use std::cmp::Ordering;
use tracing::debug;

/// Exhaustive cosine-distance index over the rows of a CSR matrix.
pub struct NearestNeighbors {
    matrix: CsMat<f64>,
    row_norms: Vec<f64>,
}

impl NearestNeighbors {
    /// Fit the index over the rows of `matrix`.
    ///
    /// Fails fast with [`RecommendError::EmptyIndex`] when the matrix has
    /// no rows, rather than answering queries over nothing.
    pub fn fit(matrix: CsMat<f64>) -> Result<Self> {
        if matrix.rows() == 0 {
            return Err(RecommendError::EmptyIndex);
        }

        let row_norms = (0..matrix.rows())
            .map(|row| {
                matrix.outer_view(row).map_or(0.0, |v| {
                    v.data().iter().map(|x| x * x).sum::<f64>().sqrt()
                })
            })
            .collect();

        debug!(rows = matrix.rows(), "fitted brute-force cosine index");
        Ok(Self { matrix, row_norms })
    }

    /// Number of indexed rows.
    pub fn n_rows(&self) -> usize {
        self.matrix.rows()
    }

    /// The `k` nearest rows to `row`, ascending by (distance, row index).
    ///
    /// The query row itself is part of the result set, at distance zero
    /// whenever it has a nonzero norm. `k` is capped to the row count, so
    /// an oversized request degrades instead of failing. Ties are broken by
    /// ascending row index, which keeps the output deterministic for a
    /// fixed input matrix.
    pub fn kneighbors(&self, row: usize, k: usize) -> Vec<(usize, f64)> {
        let k = k.min(self.n_rows());
        let query_norm = self.row_norms[row];

        let mut distances: Vec<(usize, f64)> = (0..self.n_rows())
            .into_par_iter()
            .map(|other| {
                let dot = match (self.matrix.outer_view(row), self.matrix.outer_view(other)) {
                    (Some(query), Some(other_row)) => query.dot(&other_row),
                    _ => 0.0,
                };
                (other, cosine_distance(dot, query_norm, self.row_norms[other]))
            })
            .collect();

        distances.sort_unstable_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        distances.truncate(k);
        distances
    }
}

/// Cosine distance `1 - dot / (|a| * |b|)`, clamped at zero so rounding on
/// identical rows cannot produce a tiny negative distance.
///
/// A zero-norm vector is pinned to similarity 0 (distance 1) against
/// everything, the divide-by-one convention, so all-zero rows never produce
/// NaN distances.
fn cosine_distance(dot: f64, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (norm_a * norm_b)).max(0.0)
}
