//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::{auth, books, dto, reviews, users};

/// Registers the bearer-token scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        books::list_books_handler,
        books::search_books_handler,
        books::genres_handler,
        books::get_book_handler,
        books::create_book_handler,
        reviews::list_book_reviews_handler,
        reviews::create_review_handler,
        reviews::update_review_handler,
        reviews::delete_review_handler,
        auth::register_handler,
        auth::login_handler,
        users::me_handler,
        users::update_me_handler,
        users::profile_handler,
        users::get_user_handler,
        users::user_reviews_handler,
    ),
    components(
        schemas(
            dto::BookResponse,
            dto::ReviewResponse,
            dto::ReviewWithAuthorResponse,
            dto::ReviewWithBookResponse,
            dto::UserResponse,
            dto::UserStatsResponse,
            dto::MessageResponse,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            books::CreateBookRequest,
            reviews::CreateReviewRequest,
            reviews::UpdateReviewRequest,
            users::UpdateProfileRequest,
            users::UserWithStatsResponse,
            users::ProfileResponse,
            users::Pagination,
            users::PaginatedReviewsResponse,
        )
    ),
    tags(
        (name = "Book Review API", description = "API endpoints for browsing, searching and reviewing books.")
    )
)]
pub struct ApiDoc;
