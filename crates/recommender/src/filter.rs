//! Activity filter over the raw ratings.
//!
//! Drops low-activity users and low-popularity books before the pivot, so
//! the interaction matrix only contains signal-bearing rows and columns.
//!
//! ## Algorithm
//! 1. Count ratings per user over the raw input; keep users at or above
//!    the user threshold.
//! 2. Restrict the ratings to those users.
//! 3. Count ratings per book over the RESTRICTED set; keep books at or
//!    above the book threshold.
//! 4. Restrict again.
//!
//! The two passes are sequential and order-dependent: book popularity is
//! measured among active users only. A book with hundreds of drive-by
//! ratings can still fall out here, and that is the intended behavior.

use data_loader::{Isbn, Rating, UserId};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Minimum activity counts a rating must survive to reach the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityThresholds {
    /// Keep users with at least this many ratings in the raw set
    pub min_user_ratings: usize,
    /// Keep books with at least this many ratings among retained users
    pub min_book_ratings: usize,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            min_user_ratings: 200,
            min_book_ratings: 100,
        }
    }
}

/// Apply the two-pass activity filter to `ratings`.
///
/// Returns the surviving ratings in their input order. An empty result is
/// valid and propagates silently; the index fit is where emptiness becomes
/// an error.
pub fn filter_by_activity(ratings: &[Rating], thresholds: &ActivityThresholds) -> Vec<Rating> {
    // Pass 1: user activity, counted over the raw input
    let user_counts = count_ratings_per_user(ratings);
    let active_users: HashSet<UserId> = user_counts
        .into_iter()
        .filter(|&(_, count)| count >= thresholds.min_user_ratings)
        .map(|(user_id, _)| user_id)
        .collect();

    let mut filtered: Vec<Rating> = ratings
        .iter()
        .filter(|r| active_users.contains(&r.user_id))
        .cloned()
        .collect();

    debug!(
        input = ratings.len(),
        retained = filtered.len(),
        active_users = active_users.len(),
        "user activity pass"
    );

    // Pass 2: book popularity, counted over the user-restricted set
    let book_counts = count_ratings_per_book(&filtered);
    let popular_books: HashSet<Isbn> = book_counts
        .into_iter()
        .filter(|&(_, count)| count >= thresholds.min_book_ratings)
        .map(|(isbn, _)| isbn)
        .collect();

    filtered.retain(|r| popular_books.contains(&r.isbn));

    debug!(
        retained = filtered.len(),
        popular_books = popular_books.len(),
        "book popularity pass"
    );

    filtered
}

fn count_ratings_per_user(ratings: &[Rating]) -> HashMap<UserId, usize> {
    ratings
        .par_iter()
        .fold(
            || HashMap::new(),
            |mut local_counts, rating| {
                *local_counts.entry(rating.user_id).or_insert(0) += 1;
                local_counts
            },
        )
        .reduce(
            || HashMap::new(),
            |mut acc, local_counts| {
                for (user_id, count) in local_counts {
                    *acc.entry(user_id).or_insert(0) += count;
                }
                acc
            },
        )
}

fn count_ratings_per_book(ratings: &[Rating]) -> HashMap<Isbn, usize> {
    ratings
        .par_iter()
        .fold(
            || HashMap::new(),
            |mut local_counts, rating| {
                *local_counts.entry(rating.isbn.clone()).or_insert(0) += 1;
                local_counts
            },
        )
        .reduce(
            || HashMap::new(),
            |mut acc, local_counts| {
                for (isbn, count) in local_counts {
                    *acc.entry(isbn).or_insert(0) += count;
                }
                acc
            },
        )
}
