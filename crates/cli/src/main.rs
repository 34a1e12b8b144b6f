use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, UserId};
use recommender::{ActivityThresholds, Recommendation, RecommenderContext};
use std::path::PathBuf;
use std::time::Instant;

/// ShelfRecs - Book Recommendation Engine
#[derive(Parser)]
#[command(name = "shelf-recs")]
#[command(about = "Book recommendation engine using collaborative filtering", long_about = None)]
struct Cli {
    /// Path to the Book-Crossing dataset directory
    #[arg(short, long, default_value = "data/book-crossing")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend books similar to a given title
    Recommend {
        /// Exact book title to query
        #[arg(long)]
        title: String,

        /// Number of similar titles to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Minimum ratings a user needs to count as active
        #[arg(long, default_value = "200")]
        min_user_ratings: usize,

        /// Minimum ratings a book needs among active users
        #[arg(long, default_value = "100")]
        min_book_ratings: usize,
    },

    /// Search for books by title
    Search {
        /// Book title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Show user profile and rating history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Run benchmark to test query performance
    Benchmark {
        /// Number of recommendation queries to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Minimum ratings a user needs to count as active
        #[arg(long, default_value = "200")]
        min_user_ratings: usize,

        /// Minimum ratings a book needs among active users
        #[arg(long, default_value = "100")]
        min_book_ratings: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load the dataset (this may take a moment)
    println!(
        "Loading Book-Crossing dataset from {}...",
        cli.data_dir.display()
    );
    let start = Instant::now();
    let data_index = DataIndex::load_from_files(&cli.data_dir)
        .context("Failed to load Book-Crossing dataset")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            limit,
            min_user_ratings,
            min_book_ratings,
        } => handle_recommend(
            &data_index,
            &title,
            limit,
            ActivityThresholds {
                min_user_ratings,
                min_book_ratings,
            },
        )?,
        Commands::Search { title } => handle_search(&data_index, &title)?,
        Commands::User { user_id } => handle_user(&data_index, user_id)?,
        Commands::Benchmark {
            requests,
            min_user_ratings,
            min_book_ratings,
        } => handle_benchmark(
            &data_index,
            requests,
            ActivityThresholds {
                min_user_ratings,
                min_book_ratings,
            },
        )?,
    }

    Ok(())
}

/// Build the recommender once, surfacing a useful error when the
/// thresholds leave nothing to index
fn build_context(
    data_index: &DataIndex,
    thresholds: &ActivityThresholds,
) -> Result<RecommenderContext> {
    let start = Instant::now();
    let context = RecommenderContext::build(data_index, thresholds)
        .context("Failed to build the recommender (try lower thresholds?)")?;
    println!(
        "{} Indexed {} titles in {:?}",
        "✓".green(),
        context.titles().len(),
        start.elapsed()
    );
    Ok(context)
}

/// Handle the 'recommend' command
fn handle_recommend(
    data_index: &DataIndex,
    title: &str,
    limit: usize,
    thresholds: ActivityThresholds,
) -> Result<()> {
    let context = build_context(data_index, &thresholds)?.with_neighbors(limit);

    let recommendation = context
        .recommend(title)
        .with_context(|| format!("No recommendations for '{title}'"))?;

    print_recommendation(&recommendation);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(data_index: &DataIndex, title: &str) -> Result<()> {
    let title_lower = title.to_lowercase();

    // (book, match rank, popularity, avg rating, rating count)
    let mut matches: Vec<(&data_loader::Book, usize, f32, f32, u32)> = Vec::new();

    for book in data_index.books() {
        let book_title_lower = book.title.to_lowercase();

        let rank = if book_title_lower == title_lower {
            0 // Exact match
        } else if book_title_lower.contains(&title_lower) {
            1 // Substring match
        } else {
            continue;
        };

        let stats = data_index.get_book_stats(&book.isbn);
        let popularity = stats.map(|s| s.popularity_score).unwrap_or(0.0);
        let avg_rating = stats.map(|s| s.avg_rating).unwrap_or(0.0);
        let rating_count = stats.map(|s| s.rating_count).unwrap_or(0);

        matches.push((book, rank, popularity, avg_rating, rating_count));
    }

    // Sort by relevance (exact match first, then by popularity, which
    // rewards well-rated books with many ratings)
    matches.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal))
    });

    println!("{}", format!("Search results for '{title}':").bold().blue());
    for (book, _, _, avg_rating, rating_count) in matches.iter().take(20) {
        let year = book.year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string());
        println!(
            "{}: {} by {} ({}, {}) - avg {:.2} ({} ratings)",
            book.isbn, book.title, book.author, year, book.publisher, avg_rating, rating_count
        );
    }
    if matches.is_empty() {
        println!("No books matched.");
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(data_index: &DataIndex, user_id: UserId) -> Result<()> {
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    let ratings: Vec<_> = data_index.ratings_by_user(user_id).collect();

    println!("{}", format!("User ID: {user_id}").bold().blue());
    println!("{}Location: {}", "• ".green(), user.location);
    match user.age {
        Some(age) => println!("{}Age: {}", "• ".green(), age),
        None => println!("{}Age: unknown", "• ".green()),
    }

    let num_ratings = ratings.len();
    let avg_rating = if num_ratings > 0 {
        let total: f32 = ratings.iter().map(|r| r.rating).sum();
        total / num_ratings as f32
    } else {
        0.0
    };
    println!("{}Number of ratings: {}", "• ".cyan(), num_ratings);
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    // Top rated books
    let mut top_rated = ratings;
    top_rated.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    println!("Top rated books:");
    for rating in top_rated.iter().take(5) {
        match data_index.get_book(&rating.isbn) {
            Some(book) => println!("  - {} (Rating: {})", book.title, rating.rating),
            None => println!("  - ISBN {} (Rating: {})", rating.isbn, rating.rating),
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(
    data_index: &DataIndex,
    requests: usize,
    thresholds: ActivityThresholds,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("requests must be at least 1"));
    }

    let context = build_context(data_index, &thresholds)?;
    let titles = context.titles();

    // Query random indexed titles
    let mut timings = Vec::with_capacity(requests);
    for _ in 0..requests {
        let title = &titles[rand::random::<u32>() as usize % titles.len()];
        let start = Instant::now();
        context.recommend(title)?;
        timings.push(start.elapsed());
    }

    let total_time: std::time::Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print a recommendation
fn print_recommendation(recommendation: &Recommendation) {
    println!(
        "{}",
        format!("Books similar to '{}':", recommendation.title)
            .bold()
            .blue()
    );
    for (rank, neighbor) in recommendation.neighbors.iter().enumerate() {
        println!(
            "{}. {} (distance: {:.4})",
            (rank + 1).to_string().green(),
            neighbor.title,
            neighbor.distance
        );
    }
    if recommendation.neighbors.is_empty() {
        println!("No similar titles found.");
    }
}
