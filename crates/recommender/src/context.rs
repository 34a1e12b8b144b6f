//! The RecommenderContext: the built pipeline, ready to answer queries.
//!
//! Construction runs the whole batch pipeline once (filter, join, pivot,
//! fit); afterwards the context is immutable and answers any number of
//! title queries. There is no hidden module-level state anywhere: everything
//! a query needs lives in this struct.

use crate::error::{RecommendError, Result};
use crate::filter::{ActivityThresholds, filter_by_activity};
use crate::knn::NearestNeighbors;
use crate::matrix::InteractionMatrix;
use data_loader::DataIndex;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Default number of neighbors returned per query
pub const DEFAULT_NEIGHBORS: usize = 5;

/// A similar title and its cosine distance from the query row
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub title: String,
    pub distance: f64,
}

/// A resolved recommendation: the query title and its nearest titles in
/// ascending distance order
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub title: String,
    pub neighbors: Vec<Neighbor>,
}

/// Fitted pipeline state: the title index and the nearest-neighbor
/// structure over the interaction matrix rows.
pub struct RecommenderContext {
    titles: Vec<String>,
    title_to_row: HashMap<String, usize>,
    index: NearestNeighbors,
    n_neighbors: usize,
}

impl RecommenderContext {
    /// Filter the ratings held by `data`, pivot them, and fit the index.
    ///
    /// A dataset that is empty after filtering fails here with
    /// [`RecommendError::EmptyIndex`]; the filter and the matrix builder
    /// themselves let emptiness flow through.
    pub fn build(data: &DataIndex, thresholds: &ActivityThresholds) -> Result<Self> {
        let filtered = filter_by_activity(data.ratings(), thresholds);
        let interaction = InteractionMatrix::build(&filtered, data);

        debug!(
            titles = interaction.titles.len(),
            users = interaction.user_ids.len(),
            "fitting neighbor index"
        );
        let index = NearestNeighbors::fit(interaction.matrix)?;

        let title_to_row = interaction
            .titles
            .iter()
            .enumerate()
            .map(|(row, title)| (title.clone(), row))
            .collect();

        Ok(Self {
            titles: interaction.titles,
            title_to_row,
            index,
            n_neighbors: DEFAULT_NEIGHBORS,
        })
    }

    /// Configure how many neighbors `recommend` returns (default: 5)
    pub fn with_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    /// Titles indexed by the context, in matrix row order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// The nearest titles to `title`, ascending by cosine distance.
    ///
    /// The query title itself is never part of the result. Unknown titles
    /// fail with [`RecommendError::TitleNotFound`]; on a small matrix the
    /// result simply holds fewer neighbors.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str) -> Result<Recommendation> {
        let &row = self
            .title_to_row
            .get(title)
            .ok_or_else(|| RecommendError::TitleNotFound {
                title: title.to_string(),
            })?;

        // One extra neighbor: the query row comes back in its own result
        // set at distance zero.
        let requested = (self.n_neighbors + 1).min(self.index.n_rows());
        let mut hits = self.index.kneighbors(row, requested);
        hits.retain(|&(other, _)| other != row);
        hits.truncate(self.n_neighbors);

        Ok(Recommendation {
            title: self.titles[row].clone(),
            neighbors: hits
                .into_iter()
                .map(|(other, distance)| Neighbor {
                    title: self.titles[other].clone(),
                    distance,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Book, Rating, UserId};

    fn insert_book(index: &mut DataIndex, isbn: &str, title: &str) {
        index.insert_book(Book {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: "author".to_string(),
            year: Some(1999),
            publisher: "publisher".to_string(),
        });
    }

    fn insert_rating(index: &mut DataIndex, user_id: UserId, isbn: &str, value: f32) {
        index.insert_rating(Rating {
            user_id,
            isbn: isbn.to_string(),
            rating: value,
        });
    }

    /// Four books, three users, everything above the (2, 2) thresholds.
    /// "Twin A" and "Twin B" share an identical rating column.
    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();

        insert_book(&mut index, "t-a", "Twin A");
        insert_book(&mut index, "t-b", "Twin B");
        insert_book(&mut index, "solo", "Solo");
        insert_book(&mut index, "other", "Other");

        for user_id in 1..=3 {
            insert_rating(&mut index, user_id, "t-a", 8.0);
            insert_rating(&mut index, user_id, "t-b", 8.0);
        }
        insert_rating(&mut index, 1, "solo", 2.0);
        insert_rating(&mut index, 2, "solo", 9.0);
        insert_rating(&mut index, 1, "other", 5.0);
        insert_rating(&mut index, 3, "other", 1.0);

        index
    }

    fn loose_thresholds() -> ActivityThresholds {
        ActivityThresholds {
            min_user_ratings: 2,
            min_book_ratings: 2,
        }
    }

    #[test]
    fn test_recommend_excludes_query_and_sorts() {
        let index = create_test_index();
        let context = RecommenderContext::build(&index, &loose_thresholds()).unwrap();

        let rec = context.recommend("Twin A").unwrap();
        assert_eq!(rec.title, "Twin A");
        assert!(rec.neighbors.len() <= DEFAULT_NEIGHBORS);
        assert!(rec.neighbors.iter().all(|n| n.title != "Twin A"));
        for pair in rec.neighbors.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_identical_columns_rank_first_at_zero() {
        let index = create_test_index();
        let context = RecommenderContext::build(&index, &loose_thresholds()).unwrap();

        let rec = context.recommend("Twin A").unwrap();
        assert_eq!(rec.neighbors[0].title, "Twin B");
        assert!(rec.neighbors[0].distance.abs() < 1e-9);
    }

    #[test]
    fn test_unknown_title_is_typed_error() {
        let index = create_test_index();
        let context = RecommenderContext::build(&index, &loose_thresholds()).unwrap();

        let err = context.recommend("No Such Book").unwrap_err();
        match err {
            RecommendError::TitleNotFound { title } => assert_eq!(title, "No Such Book"),
            other => panic!("expected TitleNotFound, got {other:?}"),
        }

        // The context stays usable after a failed lookup
        assert!(context.recommend("Solo").is_ok());
    }

    #[test]
    fn test_small_matrix_caps_neighbor_count() {
        // Four titles total: at most three neighbors can come back even
        // though the default request is five plus self
        let index = create_test_index();
        let context = RecommenderContext::build(&index, &loose_thresholds()).unwrap();

        for title in ["Twin A", "Twin B", "Solo", "Other"] {
            let rec = context.recommend(title).unwrap();
            assert_eq!(rec.neighbors.len(), 3);
        }
    }

    #[test]
    fn test_with_neighbors_overrides_count() {
        let index = create_test_index();
        let context = RecommenderContext::build(&index, &loose_thresholds())
            .unwrap()
            .with_neighbors(1);

        let rec = context.recommend("Solo").unwrap();
        assert_eq!(rec.neighbors.len(), 1);
    }

    #[test]
    fn test_build_on_overfiltered_data_is_empty_index() {
        let index = create_test_index();
        // Nothing survives the production thresholds on this tiny fixture
        let result = RecommenderContext::build(&index, &ActivityThresholds::default());
        assert!(matches!(result, Err(RecommendError::EmptyIndex)));
    }

    #[test]
    fn test_titles_congruent_with_rows() {
        let index = create_test_index();
        let context = RecommenderContext::build(&index, &loose_thresholds()).unwrap();

        // Ascending title order, one row per distinct surviving title
        assert_eq!(context.titles(), &["Other", "Solo", "Twin A", "Twin B"]);
    }
}
