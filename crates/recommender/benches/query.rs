//! Benchmarks for context building and title queries
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a synthetic dataset so the benchmark runs without the real CSV
//! files on disk.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{Book, DataIndex, Rating};
use recommender::{ActivityThresholds, RecommenderContext};

const BOOKS: usize = 200;
const USERS: u32 = 150;

/// Deterministic synthetic dataset: every user rates a spread of books with
/// a value pattern that varies by (user, book) so rows are not degenerate.
fn build_synthetic_index() -> DataIndex {
    let mut index = DataIndex::new();

    for book in 0..BOOKS {
        index.insert_book(Book {
            isbn: format!("isbn-{book:04}"),
            title: format!("Synthetic Book {book:04}"),
            author: format!("Author {}", book % 17),
            year: Some(1960 + (book % 60) as u16),
            publisher: "Bench House".to_string(),
        });
    }

    for user_id in 1..=USERS {
        for book in 0..BOOKS {
            // Sparse-ish: each user rates roughly a third of the catalog
            if (user_id as usize + book) % 3 != 0 {
                continue;
            }
            let value = 1.0 + ((user_id as usize * 7 + book * 13) % 10) as f32;
            index.insert_rating(Rating {
                user_id,
                isbn: format!("isbn-{book:04}"),
                rating: value,
            });
        }
    }

    index
}

fn bench_thresholds() -> ActivityThresholds {
    ActivityThresholds {
        min_user_ratings: 20,
        min_book_ratings: 20,
    }
}

fn bench_build_context(c: &mut Criterion) {
    let index = build_synthetic_index();

    c.bench_function("build_recommender_context", |b| {
        b.iter(|| {
            let context =
                RecommenderContext::build(black_box(&index), &bench_thresholds()).unwrap();
            black_box(context)
        })
    });
}

fn bench_recommend(c: &mut Criterion) {
    let index = build_synthetic_index();
    let context = RecommenderContext::build(&index, &bench_thresholds()).unwrap();
    let title = context.titles()[0].clone();

    c.bench_function("recommend_title", |b| {
        b.iter(|| {
            let rec = context.recommend(black_box(&title)).unwrap();
            black_box(rec)
        })
    });
}

criterion_group!(benches, bench_build_context, bench_recommend);
criterion_main!(benches);
