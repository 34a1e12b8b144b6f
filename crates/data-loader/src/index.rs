//! DataIndex building: loading the dataset and computing statistics.
//!
//! This module builds the DataIndex from parsed data:
//! - Parse the three CSV files in parallel
//! - Build primary indices (users, books, ratings)
//! - Compute aggregate statistics per book

use crate::error::Result;
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

impl DataIndex {
    /// Load the entire Book-Crossing dataset from a directory.
    ///
    /// Expects `books.csv`, `ratings.csv`, and `users.csv` inside
    /// `data_dir`. This is the main entry point for loading data.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("loading Book-Crossing dataset from {:?}", data_dir);

        let books_path = data_dir.join("books.csv");
        let ratings_path = data_dir.join("ratings.csv");
        let users_path = data_dir.join("users.csv");

        // Parse all three files in parallel. Rayon's `join` runs two
        // closures at once; nesting gives three-way parallelism.
        let ((users, books), ratings) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_books(&books_path),
                )
            },
            || parser::parse_ratings(&ratings_path),
        );

        let users = users?;
        let books = books?;
        let ratings = ratings?;

        info!(
            users = users.len(),
            books = books.len(),
            ratings = ratings.len(),
            "parsed dataset files"
        );

        let mut index = DataIndex::new();

        for user in users {
            index.insert_user(user);
        }
        for book in books {
            index.insert_book(book);
        }
        for rating in ratings {
            index.insert_rating(rating);
        }

        index.compute_book_stats();

        // Ratings pointing at ISBNs absent from books.csv are normal in this
        // dataset; the matrix join drops them later, so only log the count.
        let dangling = index
            .ratings()
            .iter()
            .filter(|r| index.get_book(&r.isbn).is_none())
            .count();
        if dangling > 0 {
            debug!(count = dangling, "ratings reference ISBNs without metadata");
        }

        info!("DataIndex built");
        Ok(index)
    }

    /// Compute aggregate statistics for all books.
    ///
    /// For each rated book: average rating, rating count, and a popularity
    /// score combining the two.
    pub fn compute_book_stats(&mut self) {
        let book_stats = self
            .book_ratings
            .par_iter()
            .map(|(isbn, positions)| {
                let rating_count = positions.len() as u32;
                let avg_rating = if rating_count > 0 {
                    let total: f32 = positions
                        .iter()
                        .map(|&pos| self.ratings[pos as usize].rating)
                        .sum();
                    total / rating_count as f32
                } else {
                    0.0
                };
                let popularity_score = compute_popularity_score(avg_rating, rating_count);

                (
                    isbn.clone(),
                    BookStats {
                        avg_rating,
                        rating_count,
                        popularity_score,
                    },
                )
            })
            .collect();
        self.book_stats = book_stats;
    }
}

/// Helper function to compute popularity score
///
/// `avg_rating * ln(rating_count + 1)` rewards both high ratings and many
/// ratings.
fn compute_popularity_score(avg_rating: f32, rating_count: u32) -> f32 {
    avg_rating * (rating_count as f32 + 1.0).ln()
}
