//! # Recommender Crate
//!
//! This crate implements the collaborative-filtering pipeline over the
//! loaded rating data.
//!
//! ## Components
//!
//! ### Activity filter
//! Two sequential passes over the raw ratings:
//! - Users with enough ratings in the raw set stay
//! - Books with enough ratings among those users stay
//!
//! ### Interaction matrix
//! Inner join to book metadata, then a title-by-user pivot stored as CSR,
//! with a title list congruent with the matrix rows.
//!
//! ### Nearest neighbors
//! Brute-force cosine distance over the matrix rows; exhaustive, exact,
//! nothing learned at fit time.
//!
//! ### RecommenderContext
//! The facade: `build` runs filter, pivot, and fit once; `recommend`
//! answers title queries against the fitted state.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use recommender::{ActivityThresholds, RecommenderContext};
//! use std::path::Path;
//!
//! let data = DataIndex::load_from_files(Path::new("data/book-crossing"))?;
//! let context = RecommenderContext::build(&data, &ActivityThresholds::default())?;
//!
//! let rec = context.recommend("The Queen of the Damned (Vampire Chronicles (Paperback))")?;
//! for neighbor in &rec.neighbors {
//!     println!("{} ({:.4})", neighbor.title, neighbor.distance);
//! }
//! ```

// Public modules
pub mod context;
pub mod error;
pub mod filter;
pub mod knn;
pub mod matrix;

// Re-export commonly used types
pub use context::{DEFAULT_NEIGHBORS, Neighbor, Recommendation, RecommenderContext};
pub use error::{RecommendError, Result};
pub use filter::{ActivityThresholds, filter_by_activity};
pub use knn::NearestNeighbors;
pub use matrix::InteractionMatrix;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_surface_is_reexported() {
        let thresholds = ActivityThresholds {
            min_user_ratings: 1,
            min_book_ratings: 1,
        };
        assert!(filter_by_activity(&[], &thresholds).is_empty());
    }

    #[test]
    fn test_neighbor_equality() {
        let a = Neighbor {
            title: "x".to_string(),
            distance: 0.25,
        };
        assert_eq!(a.clone(), a);
    }
}
