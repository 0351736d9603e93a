//! services/api/src/web/reviews.rs
//!
//! The review lifecycle: create, edit, delete, and the public per-book
//! listing. Every mutation ends with a rating recompute on the parent book.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use book_review_core::auth::AuthContext;
use book_review_core::domain::{validate_comment, validate_rating, NewReview};
use book_review_core::ports::{CatalogStore, ReviewStore, StoreError};
use book_review_core::stats;

use crate::web::dto::{MessageResponse, ReviewWithAuthorResponse};
use crate::web::error::RequestError;
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub book_id: Uuid,
    pub rating: i16,
    pub comment: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: i16,
    pub comment: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /reviews/book/{book_id} - Reviews for a book, newest first
#[utoipa::path(
    get,
    path = "/reviews/book/{book_id}",
    params(("book_id" = Uuid, Path, description = "The book id")),
    responses(
        (status = 200, description = "Reviews with author usernames", body = [ReviewWithAuthorResponse])
    )
)]
pub async fn list_book_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewWithAuthorResponse>>, RequestError> {
    let reviews = state.reviews.list_for_book(book_id).await?;
    Ok(Json(
        reviews.into_iter().map(ReviewWithAuthorResponse::from).collect(),
    ))
}

/// POST /reviews - Create a review for a book
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewWithAuthorResponse),
        (status = 400, description = "Invalid input or already reviewed"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    ),
    security(("bearer" = []))
)]
pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewWithAuthorResponse>), RequestError> {
    validate_rating(req.rating)?;
    validate_comment(&req.comment)?;

    // The parent book must exist before anything is written.
    state.catalog.get_book(req.book_id).await?;

    // The storage-level (book, user) uniqueness constraint is the arbiter
    // here; there is no racy existence pre-check.
    let created = state
        .reviews
        .create_review(NewReview {
            book_id: req.book_id,
            user_id: ctx.user_id,
            rating: req.rating,
            comment: req.comment.trim().to_string(),
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => RequestError::DuplicateReview,
            other => other.into(),
        })?;

    stats::recompute_book_rating(state.catalog.as_ref(), state.reviews.as_ref(), req.book_id)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /reviews/{id} - Update a review (owner only)
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "The review id")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewWithAuthorResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the review's author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(review_id): Path<Uuid>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewWithAuthorResponse>, RequestError> {
    let existing = state.reviews.get_review(review_id).await?;
    ctx.require_owner(existing.user_id).map_err(|_| {
        RequestError::Forbidden("Not authorized to update this review".to_string())
    })?;

    validate_rating(req.rating)?;
    validate_comment(&req.comment)?;

    let updated = state
        .reviews
        .update_review(review_id, req.rating, req.comment.trim())
        .await?;

    stats::recompute_book_rating(
        state.catalog.as_ref(),
        state.reviews.as_ref(),
        existing.book_id,
    )
    .await?;

    Ok(Json(updated.into()))
}

/// DELETE /reviews/{id} - Delete a review (owner only)
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "The review id")),
    responses(
        (status = 200, description = "Review deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the review's author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, RequestError> {
    let existing = state.reviews.get_review(review_id).await?;
    ctx.require_owner(existing.user_id).map_err(|_| {
        RequestError::Forbidden("Not authorized to delete this review".to_string())
    })?;

    state.reviews.delete_review(review_id).await?;

    // Deletions recompute too; a book's aggregates always reflect the
    // reviews currently on file.
    stats::recompute_book_rating(
        state.catalog.as_ref(),
        state.reviews.as_ref(),
        existing.book_id,
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}
