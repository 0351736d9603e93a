//! crates/book_review_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete storage backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Book, BookFilter, NewBook, NewReview, NewUser, Review, ReviewWithAuthor, ReviewWithBook, User,
};

//=========================================================================================
// Generic Store Error and Result Types
//=========================================================================================

/// A generic error type for all store operations.
/// This abstracts away the specific errors from the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    /// A storage-level uniqueness constraint was violated.
    #[error("{0} already exists")]
    Duplicate(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

/// Holds the Book records that make up the catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists books matching the filter, most recently created first.
    async fn list_books(&self, filter: &BookFilter) -> StoreResult<Vec<Book>>;

    async fn get_book(&self, book_id: Uuid) -> StoreResult<Book>;

    async fn create_book(&self, book: NewBook) -> StoreResult<Book>;

    /// Case-insensitive substring search over title, author and description.
    async fn search_books(&self, query: &str, limit: i64) -> StoreResult<Vec<Book>>;

    /// Distinct non-empty genre values across the catalog, sorted.
    async fn list_genres(&self) -> StoreResult<Vec<String>>;

    /// Persists the derived rating aggregates for a book.
    async fn set_book_rating(
        &self,
        book_id: Uuid,
        average_rating: f64,
        total_reviews: i64,
    ) -> StoreResult<()>;
}

/// Holds Review records and their read models.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn get_review(&self, review_id: Uuid) -> StoreResult<Review>;

    /// Reviews for a book, newest first, with the author's username attached.
    async fn list_for_book(&self, book_id: Uuid) -> StoreResult<Vec<ReviewWithAuthor>>;

    /// A user's reviews, newest first, with book details attached.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ReviewWithBook>>;

    /// All ratings currently on file for a book.
    async fn ratings_for_book(&self, book_id: Uuid) -> StoreResult<Vec<i16>>;

    /// All of a user's reviews, for statistics.
    async fn reviews_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Review>>;

    async fn count_for_user(&self, user_id: Uuid) -> StoreResult<i64>;

    /// Creates a review. Fails with [`StoreError::Duplicate`] when the user
    /// has already reviewed the book; the (book, user) uniqueness constraint
    /// lives in storage, not in application-level pre-checks.
    async fn create_review(&self, review: NewReview) -> StoreResult<ReviewWithAuthor>;

    async fn update_review(
        &self,
        review_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> StoreResult<ReviewWithAuthor>;

    async fn delete_review(&self, review_id: Uuid) -> StoreResult<()>;
}

/// Registers and looks up users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user. Fails with [`StoreError::Duplicate`] when the email
    /// or username is already taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn get_user(&self, user_id: Uuid) -> StoreResult<User>;

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User>;

    /// Updates the optional profile fields, leaving absent ones untouched.
    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        bio: Option<&str>,
    ) -> StoreResult<User>;
}
