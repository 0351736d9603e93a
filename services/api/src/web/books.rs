//! services/api/src/web/books.rs
//!
//! Catalog endpoints: listing, lookup, search, genres, and the admin-only
//! creation of catalog entries.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use book_review_core::auth::AuthContext;
use book_review_core::domain::{BookFilter, NewBook, ValidationError};
use book_review_core::ports::CatalogStore;

use crate::web::dto::BookResponse;
use crate::web::error::RequestError;
use crate::web::state::AppState;

/// Search results are capped; the catalog list endpoint is not.
const SEARCH_RESULT_LIMIT: i64 = 20;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
pub struct ListBooksQuery {
    /// Case-insensitive substring match over title, author and description.
    pub search: Option<String>,
    /// Exact match against any element of the genre set.
    pub genre: Option<String>,
    /// Case-insensitive substring match on the author.
    pub author: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub genre: Option<Vec<String>>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub featured: Option<bool>,
}

/// Browsers send empty strings for untouched filter fields; treat them as
/// absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /books - List books, optionally filtered
#[utoipa::path(
    get,
    path = "/books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Matching books, most recently created first", body = [BookResponse])
    )
)]
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, RequestError> {
    let filter = BookFilter {
        search: non_empty(query.search),
        genre: non_empty(query.genre),
        author: non_empty(query.author),
        featured: query.featured,
    };
    let books = state.catalog.list_books(&filter).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/search?q= - Free-text search over the catalog
#[utoipa::path(
    get,
    path = "/books/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = [BookResponse]),
        (status = 400, description = "Missing search query")
    )
)]
pub async fn search_books_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<BookResponse>>, RequestError> {
    let q = non_empty(query.q)
        .ok_or_else(|| RequestError::Validation("Search query is required".to_string()))?;
    let books = state.catalog.search_books(&q, SEARCH_RESULT_LIMIT).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/genres - Distinct non-empty genre values
#[utoipa::path(
    get,
    path = "/books/genres",
    responses(
        (status = 200, description = "Distinct genre values", body = [String])
    )
)]
pub async fn genres_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, RequestError> {
    let genres = state.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// GET /books/{id} - Look a book up by id
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "The book id")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, RequestError> {
    let book = state.catalog.get_book(book_id).await?;
    Ok(Json(book.into()))
}

/// POST /books - Create a catalog entry (admin only)
#[utoipa::path(
    post,
    path = "/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer" = []))
)]
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), RequestError> {
    ctx.require_admin().map_err(|_| {
        RequestError::Forbidden("Access denied. Admin privileges required.".to_string())
    })?;

    if req.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title").into());
    }
    if req.author.trim().is_empty() {
        return Err(ValidationError::MissingField("author").into());
    }

    let book = state
        .catalog
        .create_book(NewBook {
            title: req.title.trim().to_string(),
            author: req.author.trim().to_string(),
            description: req.description,
            isbn: req.isbn,
            cover_image: req.cover_image,
            publication_date: req.publication_date,
            genre: req.genre.unwrap_or_default(),
            pages: req.pages,
            language: req.language.unwrap_or_else(|| "English".to_string()),
            featured: req.featured.unwrap_or(false),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(book.into())))
}
