//! Error types for the recommender crate.

use thiserror::Error;

/// Errors surfaced by the recommendation pipeline.
///
/// Both variants are recoverable by the caller: a bad title should not tear
/// down the process, and an empty index is a data problem, not a bug.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// The queried title is not a row of the interaction matrix
    #[error("title not found in the rating matrix: {title}")]
    TitleNotFound { title: String },

    /// The filtered dataset produced no matrix rows to index
    #[error("cannot fit a nearest-neighbor index over an empty matrix")]
    EmptyIndex,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
