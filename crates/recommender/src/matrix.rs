//! Interaction matrix: the title-by-user pivot of the filtered ratings.
//!
//! Joins the filtered ratings to book metadata, pivots them into a
//! title-by-user grid, and stores the result in compressed sparse row form.
//! Absent cells are an implicit 0.0, indistinguishable from a stored rating
//! of zero — an accepted ambiguity of the rating scale, not something to
//! repair here.

use data_loader::{DataIndex, Rating, UserId};
use sprs::{CsMat, TriMat};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Title-by-user rating matrix in CSR form.
///
/// Row `i` of `matrix` holds the ratings of `titles[i]`; the two are exactly
/// congruent and every caller resolves query results positionally through
/// `titles`. Rows are in ascending title order, columns in ascending user
/// id order, so the matrix is identical across runs for a fixed input.
pub struct InteractionMatrix {
    /// Row labels; row `i` of `matrix` belongs to `titles[i]`
    pub titles: Vec<String>,
    /// Column labels in ascending user id order
    pub user_ids: Vec<UserId>,
    /// Sparse ratings; absent cells read as 0.0
    pub matrix: CsMat<f64>,
}

impl InteractionMatrix {
    /// Join `ratings` to the book metadata in `data` and pivot.
    ///
    /// Ratings whose ISBN has no book record are dropped (an inner join).
    /// Distinct books sharing a title collapse into a single row; when that
    /// lands several ratings from one user in the same cell, the cell takes
    /// their arithmetic mean, pivot-table style.
    pub fn build(ratings: &[Rating], data: &DataIndex) -> Self {
        // Aggregate (sum, count) per cell; BTreeMap keeps titles sorted so
        // row order falls out of the iteration.
        let mut cells: BTreeMap<String, HashMap<UserId, (f64, u32)>> = BTreeMap::new();
        let mut users: BTreeSet<UserId> = BTreeSet::new();
        let mut dropped = 0usize;

        for rating in ratings {
            let Some(book) = data.get_book(&rating.isbn) else {
                dropped += 1;
                continue;
            };

            let cell = cells
                .entry(book.title.clone())
                .or_default()
                .entry(rating.user_id)
                .or_insert((0.0, 0));
            cell.0 += f64::from(rating.rating);
            cell.1 += 1;
            users.insert(rating.user_id);
        }

        if dropped > 0 {
            debug!(count = dropped, "ratings without book metadata dropped in join");
        }

        let user_ids: Vec<UserId> = users.into_iter().collect();
        let col_of: HashMap<UserId, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(col, &user_id)| (user_id, col))
            .collect();

        let mut titles = Vec::with_capacity(cells.len());
        let mut triplets = TriMat::new((cells.len(), user_ids.len()));
        for (row, (title, row_cells)) in cells.into_iter().enumerate() {
            titles.push(title);
            for (user_id, (sum, count)) in row_cells {
                triplets.add_triplet(row, col_of[&user_id], sum / f64::from(count));
            }
        }

        debug!(
            rows = titles.len(),
            cols = user_ids.len(),
            nnz = triplets.nnz(),
            "built interaction matrix"
        );

        let matrix: CsMat<f64> = triplets.to_csr();
        Self {
            titles,
            user_ids,
            matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Book;

    fn book(isbn: &str, title: &str) -> Book {
        Book {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: "author".to_string(),
            year: None,
            publisher: "publisher".to_string(),
        }
    }

    fn rating(user_id: UserId, isbn: &str, value: f32) -> Rating {
        Rating {
            user_id,
            isbn: isbn.to_string(),
            rating: value,
        }
    }

    fn test_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert_book(book("a1", "Alpha"));
        index.insert_book(book("b1", "Beta"));
        index.insert_book(book("c1", "Gamma"));
        index
    }

    #[test]
    fn test_rows_sorted_and_congruent_with_titles() {
        let index = test_index();
        let ratings = vec![
            rating(20, "c1", 3.0),
            rating(10, "a1", 8.0),
            rating(20, "b1", 5.0),
        ];

        let interaction = InteractionMatrix::build(&ratings, &index);

        assert_eq!(interaction.titles, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(interaction.user_ids, vec![10, 20]);
        assert_eq!(interaction.matrix.rows(), 3);
        assert_eq!(interaction.matrix.cols(), 2);

        // Row i holds exactly the ratings of titles[i]
        assert_eq!(interaction.matrix.get(0, 0), Some(&8.0)); // Alpha by user 10
        assert_eq!(interaction.matrix.get(1, 1), Some(&5.0)); // Beta by user 20
        assert_eq!(interaction.matrix.get(2, 1), Some(&3.0)); // Gamma by user 20
    }

    #[test]
    fn test_absent_cells_are_zero_fill() {
        let index = test_index();
        let ratings = vec![rating(10, "a1", 8.0), rating(20, "b1", 5.0)];

        let interaction = InteractionMatrix::build(&ratings, &index);

        // Alpha was never rated by user 20: the cell is an implicit zero
        assert_eq!(interaction.matrix.get(0, 1), None);
    }

    #[test]
    fn test_join_drops_ratings_without_metadata() {
        let index = test_index();
        let ratings = vec![rating(10, "a1", 8.0), rating(10, "unknown-isbn", 9.0)];

        let interaction = InteractionMatrix::build(&ratings, &index);

        assert_eq!(interaction.titles, vec!["Alpha"]);
        assert_eq!(interaction.matrix.rows(), 1);
    }

    #[test]
    fn test_same_title_collapses_and_cell_takes_mean() {
        let mut index = test_index();
        // Two distinct ISBNs, one title
        index.insert_book(book("a2", "Alpha"));

        let ratings = vec![rating(10, "a1", 8.0), rating(10, "a2", 4.0)];
        let interaction = InteractionMatrix::build(&ratings, &index);

        assert_eq!(interaction.titles, vec!["Alpha"]);
        assert_eq!(interaction.matrix.get(0, 0), Some(&6.0));
    }

    #[test]
    fn test_empty_ratings_build_empty_matrix() {
        let index = test_index();
        let interaction = InteractionMatrix::build(&[], &index);

        assert!(interaction.titles.is_empty());
        assert!(interaction.user_ids.is_empty());
        assert_eq!(interaction.matrix.rows(), 0);
    }
}
