//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, register_handler},
        books::{
            create_book_handler, genres_handler, get_book_handler, list_books_handler,
            search_books_handler,
        },
        middleware::require_auth,
        reviews::{
            create_review_handler, delete_review_handler, list_book_reviews_handler,
            update_review_handler,
        },
        users::{
            get_user_handler, me_handler, profile_handler, update_me_handler,
            user_reviews_handler,
        },
        ApiDoc, AppState,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    // The one adapter backs all three store ports.
    let app_state = Arc::new(AppState {
        catalog: db_adapter.clone(),
        reviews: db_adapter.clone(),
        users: db_adapter,
        config: config.clone(),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/books", get(list_books_handler))
        .route("/books/search", get(search_books_handler))
        .route("/books/genres", get(genres_handler))
        .route("/books/{id}", get(get_book_handler))
        .route("/reviews/book/{book_id}", get(list_book_reviews_handler))
        .route("/users/register", post(register_handler))
        .route("/users/login", post(login_handler))
        .route("/users/profile/{id}", get(profile_handler))
        .route("/users/{id}", get(get_user_handler))
        .route("/users/{id}/reviews", get(user_reviews_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/books", post(create_book_handler))
        .route("/reviews", post(create_review_handler))
        .route(
            "/reviews/{id}",
            put(update_review_handler).delete(delete_review_handler),
        )
        .route("/users/me", get(me_handler).put(update_me_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
