//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::error::RequestError;
use crate::web::state::AppState;
use crate::web::token;

/// Middleware that verifies the `Authorization: Bearer` credential and
/// builds the request's auth context.
///
/// If valid, inserts an `AuthContext` into request extensions for handlers
/// to use. If missing, malformed or expired, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, RequestError> {
    // 1. Extract the Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            RequestError::Unauthenticated("No token, authorization denied".to_string())
        })?;

    // 2. Strip the Bearer scheme
    let raw_token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        RequestError::Unauthenticated("No token, authorization denied".to_string())
    })?;

    // 3. Verify the token and build the auth context
    let ctx = token::verify(&state.config.jwt_secret, raw_token)
        .map_err(|_| RequestError::Unauthenticated("Token is not valid".to_string()))?;

    // 4. Insert the context into request extensions
    req.extensions_mut().insert(ctx);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
