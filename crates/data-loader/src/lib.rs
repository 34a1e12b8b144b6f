//! # Data Loader Crate
//!
//! This crate handles loading and indexing the Book-Crossing dataset.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (User, Book, Rating, DataIndex)
//! - **parser**: Parse the CSV files into Rust structs
//! - **index**: Load the dataset and precompute per-book statistics
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! // Load the entire dataset
//! let index = DataIndex::load_from_files(Path::new("data/book-crossing"))?;
//!
//! // Query data
//! let user = index.get_user(276725).unwrap();
//! let book = index.get_book("034545104X").unwrap();
//! let rated = index.ratings_by_user(user.id).count();
//!
//! println!("User {} rated {} books", user.id, rated);
//! ```

// Public modules
pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    UserId,
    Isbn,
    // Core types
    User,
    Book,
    Rating,
    DataIndex,
    BookStats,
};
