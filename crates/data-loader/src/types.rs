//! Core domain types for the Book-Crossing dataset.
//!
//! This module defines the fundamental data structures used throughout the
//! system: the three record types parsed from the CSV files, precomputed
//! per-book statistics, and the `DataIndex` that holds them all in memory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user ids with book keys

/// Unique identifier for a user
pub type UserId = u32;

/// Book identifier and join key between ratings and book metadata
pub type Isbn = String;

// =============================================================================
// User-related Types
// =============================================================================

/// Represents a user in the Book-Crossing dataset.
///
/// Users are loaded for completeness and surfaced by the CLI, but the
/// recommendation core never reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Free-text "city, state, country" location string
    pub location: String,
    /// Age in years; the dataset leaves this blank for many users
    pub age: Option<u8>,
}

// =============================================================================
// Book-related Types
// =============================================================================

/// Represents a book in the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    /// Publication year; `None` when the source cell is absent, zero, or
    /// not a number
    pub year: Option<u16>,
    pub publisher: String,
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single rating from a user for a book, on the dataset's 0-10 scale.
///
/// Zero is a legal stored value, which later becomes indistinguishable from
/// the matrix builder's zero fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub isbn: Isbn,
    pub rating: f32,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Precomputed statistics for a book
///
/// These are computed once when loading data for fast lookups later
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookStats {
    pub avg_rating: f32,
    pub rating_count: u32,
    /// Popularity score derived from rating count and average
    pub popularity_score: f32,
}

// =============================================================================
// DataIndex - The Core In-Memory Database
// =============================================================================

/// Main data structure that holds all data and indices.
///
/// Ratings live in one flat `Vec` in file order; the per-user and per-book
/// indices store positions into it rather than cloned records, so every
/// iteration over `ratings()` is deterministic for a fixed input file.
#[derive(Debug)]
pub struct DataIndex {
    // Primary data stores
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) books: HashMap<Isbn, Book>,
    pub(crate) ratings: Vec<Rating>,

    // Rating indices for fast lookups (positions into `ratings`)
    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<u32>>,
    /// All ratings received by each book
    pub(crate) book_ratings: HashMap<Isbn, Vec<u32>>,

    // Precomputed statistics
    pub(crate) book_stats: HashMap<Isbn, BookStats>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            books: HashMap::new(),
            ratings: Vec::new(),
            user_ratings: HashMap::new(),
            book_ratings: HashMap::new(),
            book_stats: HashMap::new(),
        }
    }

    // Getters - these return references or borrowed views, never owned copies

    /// Get a user by id
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a book by ISBN
    pub fn get_book(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// All ratings in file order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// All books, in no particular order
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    /// All ratings made by a user, in file order
    pub fn ratings_by_user(&self, user_id: UserId) -> impl Iterator<Item = &Rating> {
        self.user_ratings
            .get(&user_id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.ratings[pos as usize])
    }

    /// All ratings received by a book, in file order
    pub fn ratings_for_book(&self, isbn: &str) -> impl Iterator<Item = &Rating> {
        self.book_ratings
            .get(isbn)
            .into_iter()
            .flatten()
            .map(|&pos| &self.ratings[pos as usize])
    }

    /// Get precomputed statistics for a book
    pub fn get_book_stats(&self, isbn: &str) -> Option<&BookStats> {
        self.book_stats.get(isbn)
    }

    // Mutators - these are used during data loading

    /// Insert a user into the index
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert a book into the index
    pub fn insert_book(&mut self, book: Book) {
        self.books.insert(book.isbn.clone(), book);
    }

    /// Insert a rating and update the per-user and per-book indices
    pub fn insert_rating(&mut self, rating: Rating) {
        let pos = self.ratings.len() as u32;

        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(pos);

        self.book_ratings
            .entry(rating.isbn.clone())
            .or_default()
            .push(pos);

        self.ratings.push(rating);
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.books.len(), self.ratings.len())
    }
}

// Implement Default trait for convenience
impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
