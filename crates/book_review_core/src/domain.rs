//! crates/book_review_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a catalog entry.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub genre: Vec<String>,
    pub pages: Option<i32>,
    pub language: String,
    pub featured: bool,
    /// Derived from the book's reviews; maintained by the rating recompute.
    pub average_rating: f64,
    /// Derived from the book's reviews; maintained by the rating recompute.
    pub total_reviews: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a catalog entry. Derived fields start at zero.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub genre: Vec<String>,
    pub pages: Option<i32>,
    pub language: String,
    pub featured: bool,
}

/// A star rating and comment left by a user on a book.
///
/// At most one review exists per (book, user) pair; the storage layer
/// enforces this with a composite unique key.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
}

/// A review together with its author's username, for book detail pages.
#[derive(Debug, Clone)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub username: String,
}

/// A review together with a summary of the reviewed book, for profile pages.
#[derive(Debug, Clone)]
pub struct ReviewWithBook {
    pub review: Review,
    pub book_title: String,
    pub book_author: String,
    pub book_cover_image: Option<String>,
    pub book_average_rating: f64,
}

// Represents a registered user. The password hash never leaves the service
// layer; response types drop it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Aggregate review statistics for a user. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserStats {
    pub total_reviews: i64,
    pub unique_books_reviewed: i64,
    /// Mean of the user's given ratings to one decimal place; 0 when the
    /// user has no reviews.
    pub average_rating: f64,
}

impl UserStats {
    pub const ZERO: UserStats = UserStats {
        total_reviews: 0,
        unique_books_reviewed: 0,
        average_rating: 0.0,
    };
}

/// Filter options for catalog listing. All options are optional and
/// combine with logical AND.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring match over title, author and description.
    pub search: Option<String>,
    /// Exact match against any element of the genre set.
    pub genre: Option<String>,
    /// Case-insensitive substring match on the author.
    pub author: Option<String>,
    pub featured: Option<bool>,
}

pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;
pub const COMMENT_MIN_LEN: usize = 10;
pub const NAME_MIN_LEN: usize = 2;
pub const BIO_MAX_LEN: usize = 500;

/// A rejected piece of user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Rating must be between {RATING_MIN} and {RATING_MAX}")]
    InvalidRating,
    #[error("Comment must be at least {COMMENT_MIN_LEN} characters long")]
    CommentTooShort,
    #[error("Name must be at least {NAME_MIN_LEN} characters long")]
    NameTooShort,
    #[error("Bio must be less than {BIO_MAX_LEN} characters")]
    BioTooLong,
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Checks that a rating falls in the closed range [1, 5].
pub fn validate_rating(rating: i16) -> Result<(), ValidationError> {
    if (RATING_MIN..=RATING_MAX).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::InvalidRating)
    }
}

/// Checks the minimum comment length. Enforced here rather than trusted to
/// the client.
pub fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    if comment.trim().len() >= COMMENT_MIN_LEN {
        Ok(())
    } else {
        Err(ValidationError::CommentTooShort)
    }
}

/// Checks the minimum display-name length for profile updates.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().len() >= NAME_MIN_LEN {
        Ok(())
    } else {
        Err(ValidationError::NameTooShort)
    }
}

/// Checks the maximum bio length for profile updates.
pub fn validate_bio(bio: &str) -> Result<(), ValidationError> {
    if bio.len() <= BIO_MAX_LEN {
        Ok(())
    } else {
        Err(ValidationError::BioTooLong)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert_eq!(validate_rating(0), Err(ValidationError::InvalidRating));
        assert_eq!(validate_rating(6), Err(ValidationError::InvalidRating));
        assert_eq!(validate_rating(-3), Err(ValidationError::InvalidRating));
    }

    #[test]
    fn comment_length_ignores_surrounding_whitespace() {
        assert!(validate_comment("a solid read").is_ok());
        assert_eq!(
            validate_comment("   short   "),
            Err(ValidationError::CommentTooShort)
        );
        assert_eq!(validate_comment(""), Err(ValidationError::CommentTooShort));
    }

    #[test]
    fn name_and_bio_boundaries() {
        assert!(validate_name("Jo").is_ok());
        assert_eq!(validate_name("J"), Err(ValidationError::NameTooShort));
        assert!(validate_bio(&"x".repeat(500)).is_ok());
        assert_eq!(
            validate_bio(&"x".repeat(501)),
            Err(ValidationError::BioTooLong)
        );
    }
}
