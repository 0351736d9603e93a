//! crates/book_review_core/src/stats.rs
//!
//! The statistics engine: derives per-user and per-book review aggregates
//! from the review store on demand.

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::{Review, UserStats};
use crate::ports::{CatalogStore, ReviewStore, StoreResult};

/// Rounds `sum / count` to one decimal place, returned in tenths.
///
/// Round-half-up on the decimal digit, computed in integer arithmetic so
/// halves are exact. Returns 0 when `count` is 0.
pub fn mean_tenths(sum: i64, count: i64) -> i64 {
    if count == 0 {
        return 0;
    }
    (sum * 20 + count) / (2 * count)
}

/// Folds a user's reviews into their aggregate statistics.
///
/// An empty slice yields all-zero stats, so an unknown user id simply
/// produces zeros rather than an error.
pub fn user_stats(reviews: &[Review]) -> UserStats {
    if reviews.is_empty() {
        return UserStats::ZERO;
    }
    let total = reviews.len() as i64;
    let unique: HashSet<Uuid> = reviews.iter().map(|r| r.book_id).collect();
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    UserStats {
        total_reviews: total,
        unique_books_reviewed: unique.len() as i64,
        average_rating: mean_tenths(sum, total) as f64 / 10.0,
    }
}

/// Computes a user's aggregate statistics by scanning the review store.
pub async fn compute_user_stats(reviews: &dyn ReviewStore, user_id: Uuid) -> StoreResult<UserStats> {
    let rows = reviews.reviews_for_user(user_id).await?;
    Ok(user_stats(&rows))
}

/// Recomputes and persists a book's `average_rating` and `total_reviews`
/// from the reviews currently on file.
///
/// Must run after every review creation, update and deletion that touches
/// the book. Recomputing from the same underlying review set is idempotent,
/// so a repeated call is safe. Returns the persisted pair.
pub async fn recompute_book_rating(
    catalog: &dyn CatalogStore,
    reviews: &dyn ReviewStore,
    book_id: Uuid,
) -> StoreResult<(f64, i64)> {
    let ratings = reviews.ratings_for_book(book_id).await?;
    let count = ratings.len() as i64;
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let average = mean_tenths(sum, count) as f64 / 10.0;
    catalog.set_book_rating(book_id, average, count).await?;
    Ok((average, count))
}
