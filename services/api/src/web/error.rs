//! services/api/src/web/error.rs
//!
//! The request-level error type. Every failure a handler can produce maps
//! to a status code and a JSON body with a human-readable `message` field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use book_review_core::auth::GateError;
use book_review_core::domain::ValidationError;
use book_review_core::ports::StoreError;

/// A failure surfaced to the caller.
///
/// Storage failures keep their detail internal: the detail is logged and the
/// caller only sees a generic message.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The credential is missing, malformed or expired.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not permitted.
    #[error("{0}")]
    Forbidden(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The (book, user) review uniqueness constraint was violated.
    #[error("You have already reviewed this book")]
    DuplicateReview,

    /// An unexpected backend failure. The payload is for the log only.
    #[error("Server error")]
    Storage(String),
}

impl RequestError {
    fn status(&self) -> StatusCode {
        match self {
            RequestError::Validation(_) | RequestError::DuplicateReview => StatusCode::BAD_REQUEST,
            RequestError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden(_) => StatusCode::FORBIDDEN,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The JSON body returned for every failure.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        if let RequestError::Storage(detail) = &self {
            error!("storage failure: {detail}");
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for RequestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => RequestError::NotFound(format!("{what} not found")),
            StoreError::Duplicate(what) => {
                RequestError::Validation(format!("{what} already exists"))
            }
            StoreError::Unexpected(detail) => RequestError::Storage(detail),
        }
    }
}

impl From<ValidationError> for RequestError {
    fn from(err: ValidationError) -> Self {
        RequestError::Validation(err.to_string())
    }
}

impl From<GateError> for RequestError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthenticated => {
                RequestError::Unauthenticated("No token, authorization denied".to_string())
            }
            GateError::Forbidden => RequestError::Forbidden("Access denied".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            RequestError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RequestError::DuplicateReview.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RequestError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RequestError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RequestError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::Storage("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_is_not_shown_to_the_caller() {
        let err = RequestError::Storage("connection reset by peer".into());
        assert_eq!(err.to_string(), "Server error");
    }

    #[test]
    fn store_errors_map_to_the_taxonomy() {
        let err: RequestError = StoreError::NotFound("Book".into()).into();
        assert!(matches!(err, RequestError::NotFound(_)));
        let err: RequestError = StoreError::Duplicate("User".into()).into();
        assert!(matches!(err, RequestError::Validation(_)));
        let err: RequestError = StoreError::Unexpected("boom".into()).into();
        assert!(matches!(err, RequestError::Storage(_)));
    }
}
