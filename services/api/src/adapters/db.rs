//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the store ports from the `core` crate. It handles all
//! interactions with the PostgreSQL database using `sqlx`.
//!
//! Queries use the runtime-checked API rather than the `query!` macros so
//! the crate builds without a live `DATABASE_URL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use book_review_core::domain::{
    Book, BookFilter, NewBook, NewReview, NewUser, Review, ReviewWithAuthor, ReviewWithBook, User,
};
use book_review_core::ports::{
    CatalogStore, ReviewStore, StoreError, StoreResult, UserStore,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// True when the error is a Postgres unique-constraint violation (23505).
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn unexpected(e: sqlx::Error) -> StoreError {
    StoreError::Unexpected(e.to_string())
}

const BOOK_COLUMNS: &str = "id, title, author, description, isbn, cover_image, publication_date, \
     genre, pages, language, featured, average_rating, total_reviews, created_at, updated_at";

const REVIEW_COLUMNS: &str = "id, book_id, user_id, rating, comment, created_at, updated_at";

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    title: String,
    author: String,
    description: Option<String>,
    isbn: Option<String>,
    cover_image: Option<String>,
    publication_date: Option<DateTime<Utc>>,
    genre: Vec<String>,
    pages: Option<i32>,
    language: String,
    featured: bool,
    average_rating: f64,
    total_reviews: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            description: self.description,
            isbn: self.isbn,
            cover_image: self.cover_image,
            publication_date: self.publication_date,
            genre: self.genre,
            pages: self.pages,
            language: self.language,
            featured: self.featured,
            average_rating: self.average_rating,
            total_reviews: self.total_reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ReviewRecord {
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewRecord {
    fn to_domain(self) -> Review {
        Review {
            id: self.id,
            book_id: self.book_id,
            user_id: self.user_id,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ReviewWithAuthorRecord {
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    username: String,
}

impl ReviewWithAuthorRecord {
    fn to_domain(self) -> ReviewWithAuthor {
        ReviewWithAuthor {
            review: Review {
                id: self.id,
                book_id: self.book_id,
                user_id: self.user_id,
                rating: self.rating,
                comment: self.comment,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            username: self.username,
        }
    }
}

#[derive(FromRow)]
struct ReviewWithBookRecord {
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    book_title: String,
    book_author: String,
    book_cover_image: Option<String>,
    book_average_rating: f64,
}

impl ReviewWithBookRecord {
    fn to_domain(self) -> ReviewWithBook {
        ReviewWithBook {
            review: Review {
                id: self.id,
                book_id: self.book_id,
                user_id: self.user_id,
                rating: self.rating,
                comment: self.comment,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            book_title: self.book_title,
            book_author: self.book_author,
            book_cover_image: self.book_cover_image,
            book_average_rating: self.book_average_rating,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    name: Option<String>,
    bio: Option<String>,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            bio: self.bio,
            is_admin: self.is_admin,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//=========================================================================================
// `CatalogStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogStore for DbAdapter {
    async fn list_books(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE true"
        ));

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR author ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(genre) = &filter.genre {
            qb.push(" AND ").push_bind(genre.clone()).push(" = ANY(genre)");
        }
        if let Some(author) = &filter.author {
            qb.push(" AND author ILIKE ")
                .push_bind(format!("%{}%", author));
        }
        if let Some(featured) = filter.featured {
            qb.push(" AND featured = ").push_bind(featured);
        }
        qb.push(" ORDER BY created_at DESC");

        let records: Vec<BookRecord> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_book(&self, book_id: Uuid) -> StoreResult<Book> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(book_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("Book {}", book_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "INSERT INTO books (id, title, author, description, isbn, cover_image, \
             publication_date, genre, pages, language, featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(book.title)
        .bind(book.author)
        .bind(book.description)
        .bind(book.isbn)
        .bind(book.cover_image)
        .bind(book.publication_date)
        .bind(book.genre)
        .bind(book.pages)
        .bind(book.language)
        .bind(book.featured)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn search_books(&self, query: &str, limit: i64) -> StoreResult<Vec<Book>> {
        let pattern = format!("%{}%", query);
        let records = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE title ILIKE $1 OR author ILIKE $1 OR description ILIKE $1 \
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_genres(&self) -> StoreResult<Vec<String>> {
        let genres = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT g FROM books, unnest(genre) AS g WHERE g <> '' ORDER BY g",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(genres)
    }

    async fn set_book_rating(
        &self,
        book_id: Uuid,
        average_rating: f64,
        total_reviews: i64,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE books SET average_rating = $1, total_reviews = $2, updated_at = now() \
             WHERE id = $3",
        )
        .bind(average_rating)
        .bind(total_reviews)
        .bind(book_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Book {}", book_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `ReviewStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReviewStore for DbAdapter {
    async fn get_review(&self, review_id: Uuid) -> StoreResult<Review> {
        let record = sqlx::query_as::<_, ReviewRecord>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(review_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("Review {}", review_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_for_book(&self, book_id: Uuid) -> StoreResult<Vec<ReviewWithAuthor>> {
        let records = sqlx::query_as::<_, ReviewWithAuthorRecord>(
            "SELECT r.id, r.book_id, r.user_id, r.rating, r.comment, r.created_at, \
             r.updated_at, u.username \
             FROM reviews r JOIN users u ON u.id = r.user_id \
             WHERE r.book_id = $1 ORDER BY r.created_at DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ReviewWithBook>> {
        let records = sqlx::query_as::<_, ReviewWithBookRecord>(
            "SELECT r.id, r.book_id, r.user_id, r.rating, r.comment, r.created_at, \
             r.updated_at, b.title AS book_title, b.author AS book_author, \
             b.cover_image AS book_cover_image, b.average_rating AS book_average_rating \
             FROM reviews r JOIN books b ON b.id = r.book_id \
             WHERE r.user_id = $1 ORDER BY r.created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn ratings_for_book(&self, book_id: Uuid) -> StoreResult<Vec<i16>> {
        let ratings = sqlx::query_scalar::<_, i16>(
            "SELECT rating FROM reviews WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(ratings)
    }

    async fn reviews_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Review>> {
        let records = sqlx::query_as::<_, ReviewRecord>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_for_user(&self, user_id: Uuid) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reviews WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(count)
    }

    async fn create_review(&self, review: NewReview) -> StoreResult<ReviewWithAuthor> {
        // The composite unique key on (book_id, user_id) closes the
        // check-then-act race; a violation is the duplicate-review signal.
        let record = sqlx::query_as::<_, ReviewWithAuthorRecord>(
            "WITH inserted AS ( \
                 INSERT INTO reviews (id, book_id, user_id, rating, comment) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, book_id, user_id, rating, comment, created_at, updated_at \
             ) \
             SELECT i.id, i.book_id, i.user_id, i.rating, i.comment, i.created_at, \
             i.updated_at, u.username \
             FROM inserted i JOIN users u ON u.id = i.user_id",
        )
        .bind(Uuid::new_v4())
        .bind(review.book_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(review.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate("Review".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> StoreResult<ReviewWithAuthor> {
        let record = sqlx::query_as::<_, ReviewWithAuthorRecord>(
            "WITH updated AS ( \
                 UPDATE reviews SET rating = $2, comment = $3, updated_at = now() \
                 WHERE id = $1 \
                 RETURNING id, book_id, user_id, rating, comment, created_at, updated_at \
             ) \
             SELECT u2.id, u2.book_id, u2.user_id, u2.rating, u2.comment, u2.created_at, \
             u2.updated_at, u.username \
             FROM updated u2 JOIN users u ON u.id = u2.user_id",
        )
        .bind(review_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("Review {}", review_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn delete_review(&self, review_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Review {}", review_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

const USER_COLUMNS: &str =
    "id, username, email, password_hash, name, bio, is_admin, created_at, updated_at";

#[async_trait]
impl UserStore for DbAdapter {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, username, email, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate("User".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("User {}", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("User {}", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        bio: Option<&str>,
    ) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET name = COALESCE($2, name), bio = COALESCE($3, bio), \
             updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(name)
        .bind(bio)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("User {}", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }
}
