//! services/api/src/web/dto.rs
//!
//! Response payloads shared across handler modules, with conversions from
//! the core domain types. The user's password hash never appears here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use book_review_core::domain::{
    Book, Review, ReviewWithAuthor, ReviewWithBook, User, UserStats,
};

#[derive(Serialize, ToSchema)]
pub struct BookResponse {
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
    pub average_rating: f64,
    pub total_reviews: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            isbn: book.isbn,
            cover_image: book.cover_image,
            publication_date: book.publication_date,
            genre: book.genre,
            pages: book.pages,
            language: book.language,
            featured: book.featured,
            average_rating: book.average_rating,
            total_reviews: book.total_reviews,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            book_id: review.book_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

/// A review on a book detail page, with the author's username.
#[derive(Serialize, ToSchema)]
pub struct ReviewWithAuthorResponse {
    #[serde(flatten)]
    pub review: ReviewResponse,
    pub username: String,
}

impl From<ReviewWithAuthor> for ReviewWithAuthorResponse {
    fn from(row: ReviewWithAuthor) -> Self {
        Self {
            review: row.review.into(),
            username: row.username,
        }
    }
}

/// A review on a profile page, with a summary of the reviewed book.
#[derive(Serialize, ToSchema)]
pub struct ReviewWithBookResponse {
    #[serde(flatten)]
    pub review: ReviewResponse,
    pub book_title: String,
    pub book_author: String,
    pub book_cover_image: Option<String>,
    pub book_average_rating: f64,
}

impl From<ReviewWithBook> for ReviewWithBookResponse {
    fn from(row: ReviewWithBook) -> Self {
        Self {
            review: row.review.into(),
            book_title: row.book_title,
            book_author: row.book_author,
            book_cover_image: row.book_cover_image,
            book_average_rating: row.book_average_rating,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            bio: user.bio,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserStatsResponse {
    pub total_reviews: i64,
    pub unique_books_reviewed: i64,
    pub average_rating: f64,
}

impl From<UserStats> for UserStatsResponse {
    fn from(stats: UserStats) -> Self {
        Self {
            total_reviews: stats.total_reviews,
            unique_books_reviewed: stats.unique_books_reviewed,
            average_rating: stats.average_rating,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
