//! services/api/src/web/token.rs
//!
//! Issues and verifies the bearer credential: an HS256 JWT carrying the
//! user id and admin flag, valid for a fixed window from issuance.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use book_review_core::auth::{AuthContext, GateError};

/// Fixed credential validity window.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// The claims embedded in the credential. Admin status is captured at
/// issuance time; revocation takes effect at the next login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub admin: bool,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
}

/// Signs a new credential for the user.
pub fn issue(secret: &str, user_id: Uuid, is_admin: bool) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        admin: is_admin,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies a credential and produces the request's [`AuthContext`].
///
/// Malformed, badly-signed and expired tokens all collapse to
/// [`GateError::Unauthenticated`]; the caller learns nothing about which.
pub fn verify(secret: &str, token: &str) -> Result<AuthContext, GateError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| GateError::Unauthenticated)?;

    let issued_at: DateTime<Utc> = Utc
        .timestamp_opt(data.claims.iat, 0)
        .single()
        .ok_or(GateError::Unauthenticated)?;

    Ok(AuthContext {
        user_id: data.claims.sub,
        is_admin: data.claims.admin,
        issued_at,
    })
}
