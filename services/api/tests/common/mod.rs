//! Shared test fixtures: an in-memory implementation of the store ports and
//! helpers for building application state.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use api_lib::config::Config;
use api_lib::web::AppState;
use book_review_core::auth::AuthContext;
use book_review_core::domain::{
    Book, BookFilter, NewBook, NewReview, NewUser, Review, ReviewWithAuthor, ReviewWithBook, User,
};
use book_review_core::ports::{
    CatalogStore, ReviewStore, StoreError, StoreResult, UserStore,
};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_ADMIN_CODE: &str = "letmein";

/// An in-memory store backing all three ports, mirroring the storage
/// semantics the Postgres adapter relies on (including the composite
/// (book, user) uniqueness constraint on reviews).
#[derive(Default)]
pub struct MemoryStore {
    books: Mutex<Vec<Book>>,
    reviews: Mutex<Vec<Review>>,
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    fn username_of(&self, user_id: Uuid) -> StoreResult<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| StoreError::Unexpected(format!("no user {user_id} on file")))
    }

    fn with_author(&self, review: Review) -> StoreResult<ReviewWithAuthor> {
        let username = self.username_of(review.user_id)?;
        Ok(ReviewWithAuthor { review, username })
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_books(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let mut books: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                let search_ok = filter.search.as_ref().map_or(true, |q| {
                    let q = q.to_lowercase();
                    b.title.to_lowercase().contains(&q)
                        || b.author.to_lowercase().contains(&q)
                        || b.description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(&q))
                });
                let genre_ok = filter
                    .genre
                    .as_ref()
                    .map_or(true, |g| b.genre.iter().any(|bg| bg == g));
                let author_ok = filter
                    .author
                    .as_ref()
                    .map_or(true, |a| b.author.to_lowercase().contains(&a.to_lowercase()));
                let featured_ok = filter.featured.map_or(true, |f| b.featured == f);
                search_ok && genre_ok && author_ok && featured_ok
            })
            .cloned()
            .collect();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(books)
    }

    async fn get_book(&self, book_id: Uuid) -> StoreResult<Book> {
        self.books
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == book_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Book {book_id}")))
    }

    async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
        let now = Utc::now();
        let created = Book {
            id: Uuid::new_v4(),
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
            average_rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        self.books.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn search_books(&self, query: &str, limit: i64) -> StoreResult<Vec<Book>> {
        let filter = BookFilter {
            search: Some(query.to_string()),
            ..BookFilter::default()
        };
        let mut books = self.list_books(&filter).await?;
        books.truncate(limit as usize);
        Ok(books)
    }

    async fn list_genres(&self) -> StoreResult<Vec<String>> {
        let mut genres: Vec<String> = self
            .books
            .lock()
            .unwrap()
            .iter()
            .flat_map(|b| b.genre.iter().cloned())
            .filter(|g| !g.is_empty())
            .collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }

    async fn set_book_rating(
        &self,
        book_id: Uuid,
        average_rating: f64,
        total_reviews: i64,
    ) -> StoreResult<()> {
        let mut books = self.books.lock().unwrap();
        let book = books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| StoreError::NotFound(format!("Book {book_id}")))?;
        book.average_rating = average_rating;
        book.total_reviews = total_reviews;
        book.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn get_review(&self, review_id: Uuid) -> StoreResult<Review> {
        self.reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == review_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Review {review_id}")))
    }

    async fn list_for_book(&self, book_id: Uuid) -> StoreResult<Vec<ReviewWithAuthor>> {
        let mut rows: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter().map(|r| self.with_author(r)).collect()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ReviewWithBook>> {
        let mut rows: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| {
                let books = self.books.lock().unwrap();
                let book = books
                    .iter()
                    .find(|b| b.id == r.book_id)
                    .ok_or_else(|| StoreError::Unexpected(format!("no book {} on file", r.book_id)))?;
                Ok(ReviewWithBook {
                    book_title: book.title.clone(),
                    book_author: book.author.clone(),
                    book_cover_image: book.cover_image.clone(),
                    book_average_rating: book.average_rating,
                    review: r,
                })
            })
            .collect()
    }

    async fn ratings_for_book(&self, book_id: Uuid) -> StoreResult<Vec<i16>> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.book_id == book_id)
            .map(|r| r.rating)
            .collect())
    }

    async fn reviews_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Review>> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_for_user(&self, user_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .count() as i64)
    }

    async fn create_review(&self, review: NewReview) -> StoreResult<ReviewWithAuthor> {
        let mut reviews = self.reviews.lock().unwrap();
        // The in-memory stand-in for the composite unique key.
        if reviews
            .iter()
            .any(|r| r.book_id == review.book_id && r.user_id == review.user_id)
        {
            return Err(StoreError::Duplicate("Review".to_string()));
        }
        let now = Utc::now();
        let created = Review {
            id: Uuid::new_v4(),
            book_id: review.book_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        reviews.push(created.clone());
        drop(reviews);
        self.with_author(created)
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> StoreResult<ReviewWithAuthor> {
        let mut reviews = self.reviews.lock().unwrap();
        let review = reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or_else(|| StoreError::NotFound(format!("Review {review_id}")))?;
        review.rating = rating;
        review.comment = comment.to_string();
        review.updated_at = Utc::now();
        let updated = review.clone();
        drop(reviews);
        self.with_author(updated)
    }

    async fn delete_review(&self, review_id: Uuid) -> StoreResult<()> {
        let mut reviews = self.reviews.lock().unwrap();
        let before = reviews.len();
        reviews.retain(|r| r.id != review_id);
        if reviews.len() == before {
            return Err(StoreError::NotFound(format!("Review {review_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(StoreError::Duplicate("User".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            name: None,
            bio: None,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {user_id}")))
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {email}")))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        bio: Option<&str>,
    ) -> StoreResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("User {user_id}")))?;
        if let Some(name) = name {
            user.name = Some(name.to_string());
        }
        if let Some(bio) = bio {
            user.bio = Some(bio.to_string());
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// Builds an `AppState` backed by a fresh in-memory store.
pub fn test_state() -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        jwt_secret: TEST_SECRET.to_string(),
        admin_signup_code: Some(TEST_ADMIN_CODE.to_string()),
        cors_origin: "http://localhost:5173".to_string(),
    };
    let state = Arc::new(AppState {
        catalog: store.clone(),
        reviews: store.clone(),
        users: store.clone(),
        config: Arc::new(config),
    });
    (state, store)
}

pub async fn seed_user(state: &AppState, username: &str, is_admin: bool) -> User {
    state
        .users
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$test".to_string(),
            is_admin,
        })
        .await
        .unwrap()
}

pub async fn seed_book(state: &AppState, title: &str) -> Book {
    state
        .catalog
        .create_book(NewBook {
            title: title.to_string(),
            author: "Test Author".to_string(),
            description: None,
            isbn: None,
            cover_image: None,
            publication_date: None,
            genre: vec![],
            pages: None,
            language: "English".to_string(),
            featured: false,
        })
        .await
        .unwrap()
}

pub fn ctx_for(user: &User) -> AuthContext {
    AuthContext {
        user_id: user.id,
        is_admin: user.is_admin,
        issued_at: Utc::now(),
    }
}
