//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use book_review_core::domain::{NewUser, ValidationError};
use book_review_core::ports::{StoreError, UserStore};

use crate::web::dto::UserResponse;
use crate::web::error::RequestError;
use crate::web::state::AppState;
use crate::web::token;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Compared against the configured signup code; a match makes the new
    /// account an admin.
    pub admin_code: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /users/register - Create a new user account
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request or user already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), RequestError> {
    if req.username.trim().is_empty() {
        return Err(ValidationError::MissingField("username").into());
    }
    if req.email.trim().is_empty() {
        return Err(ValidationError::MissingField("email").into());
    }
    if req.password.is_empty() {
        return Err(ValidationError::MissingField("password").into());
    }

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            RequestError::Storage("password hashing failed".to_string())
        })?
        .to_string();

    // 2. Decide the role. The supplied code only matters when a signup code
    //    is configured at all.
    let is_admin = match (&state.config.admin_signup_code, &req.admin_code) {
        (Some(code), Some(supplied)) => code == supplied,
        _ => false,
    };

    // 3. Create the user; a taken email or username surfaces as 400
    let user = state
        .users
        .create_user(NewUser {
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
            is_admin,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => RequestError::Validation("User already exists".to_string()),
            other => other.into(),
        })?;

    // 4. Issue the bearer credential
    let token = token::issue(&state.config.jwt_secret, user.id, user.is_admin).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        RequestError::Storage("token signing failed".to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /users/login - Login with existing account
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, RequestError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(RequestError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // 1. Look the user up; an unknown email reads the same as a bad password
    let user = state
        .users
        .get_user_by_email(req.email.trim())
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => RequestError::Validation("Invalid credentials".to_string()),
            other => other.into(),
        })?;

    // 2. Verify the password
    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        RequestError::Storage("stored password hash is malformed".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err(RequestError::Validation("Invalid credentials".to_string()));
    }

    // 3. Issue the bearer credential
    let token = token::issue(&state.config.jwt_secret, user.id, user.is_admin).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        RequestError::Storage("token signing failed".to_string())
    })?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
