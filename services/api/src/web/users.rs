//! services/api/src/web/users.rs
//!
//! Profile endpoints: the current user, public profiles with recent
//! reviews and statistics, and profile updates.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use book_review_core::auth::AuthContext;
use book_review_core::domain::{validate_bio, validate_name};
use book_review_core::ports::{ReviewStore, UserStore};
use book_review_core::stats;

use crate::web::dto::{ReviewWithBookResponse, UserResponse, UserStatsResponse};
use crate::web::error::RequestError;
use crate::web::state::AppState;

/// How many recent reviews a profile page shows.
const PROFILE_REVIEW_LIMIT: i64 = 10;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct UserWithStatsResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub stats: UserStatsResponse,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub reviews: Vec<ReviewWithBookResponse>,
    pub stats: UserStatsResponse,
}

#[derive(Serialize, ToSchema)]
pub struct Pagination {
    pub current: i64,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedReviewsResponse {
    pub reviews: Vec<ReviewWithBookResponse>,
    pub pagination: Pagination,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /users/me - The current user with their review statistics
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user and stats", body = UserWithStatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<UserWithStatsResponse>, RequestError> {
    let user = state.users.get_user(ctx.user_id).await?;
    let user_stats = stats::compute_user_stats(state.reviews.as_ref(), ctx.user_id).await?;
    Ok(Json(UserWithStatsResponse {
        user: user.into(),
        stats: user_stats.into(),
    }))
}

/// PUT /users/me - Update the current user's profile
#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid name or bio"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_me_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, RequestError> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    if let Some(bio) = &req.bio {
        validate_bio(bio)?;
    }

    let user = state
        .users
        .update_profile(
            ctx.user_id,
            req.name.as_deref().map(str::trim),
            req.bio.as_deref(),
        )
        .await?;

    Ok(Json(user.into()))
}

/// GET /users/profile/{id} - A public profile with recent reviews and stats
#[utoipa::path(
    get,
    path = "/users/profile/{id}",
    params(("id" = Uuid, Path, description = "The user id")),
    responses(
        (status = 200, description = "Profile, recent reviews, stats", body = ProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, RequestError> {
    let user = state.users.get_user(user_id).await?;
    let reviews = state
        .reviews
        .list_for_user(user_id, PROFILE_REVIEW_LIMIT, 0)
        .await?;
    let user_stats = stats::compute_user_stats(state.reviews.as_ref(), user_id).await?;

    Ok(Json(ProfileResponse {
        user: user.into(),
        reviews: reviews.into_iter().map(ReviewWithBookResponse::from).collect(),
        stats: user_stats.into(),
    }))
}

/// GET /users/{id} - A public user record
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "The user id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, RequestError> {
    let user = state.users.get_user(user_id).await?;
    Ok(Json(user.into()))
}

/// GET /users/{id}/reviews - A user's reviews, paginated
#[utoipa::path(
    get,
    path = "/users/{id}/reviews",
    params(("id" = Uuid, Path, description = "The user id"), PageQuery),
    responses(
        (status = 200, description = "Reviews with book details", body = PaginatedReviewsResponse)
    )
)]
pub async fn user_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedReviewsResponse>, RequestError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let reviews = state.reviews.list_for_user(user_id, limit, offset).await?;
    let total = state.reviews.count_for_user(user_id).await?;
    let total_pages = (total + limit - 1) / limit;

    let has_next = offset + (reviews.len() as i64) < total;
    Ok(Json(PaginatedReviewsResponse {
        reviews: reviews.into_iter().map(ReviewWithBookResponse::from).collect(),
        pagination: Pagination {
            current: page,
            total: total_pages,
            has_next,
            has_prev: page > 1,
        },
    }))
}
