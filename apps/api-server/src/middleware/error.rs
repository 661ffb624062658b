//! Error handling - every failure renders as `{"error": "<message>"}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::error::{DomainError, RepoError};
use quill_core::ports::{AuthError, StorageError};
use quill_shared::ErrorResponse;
use std::fmt;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type that converts to JSON error responses.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                INTERNAL_MESSAGE
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.as_str(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse::new(message))
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            e @ RepoError::MissingReference(_) => AppError::Internal(e.to_string()),
            RepoError::Connection(msg) => {
                AppError::Internal(format!("Database connection error: {}", msg))
            }
            RepoError::Query(msg) => AppError::Internal(format!("Database query error: {}", msg)),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            e @ AuthError::InvalidCredentials => AppError::Unauthorized(e.to_string()),
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Invalid token".to_string())
            }
            e @ AuthError::MissingAuth => AppError::Unauthorized(e.to_string()),
            e @ (AuthError::Signing(_) | AuthError::HashingError(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_single_error_body() {
        let (status, body) = body_of(AppError::NotFound("Post not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "Post not found" }));
    }

    #[actix_web::test]
    async fn test_internal_detail_is_hidden() {
        let (status, body) = body_of(AppError::Internal("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_MESSAGE);
    }

    #[test]
    fn test_token_failures_are_indistinguishable() {
        let expired = AppError::from(AuthError::TokenExpired);
        let invalid = AppError::from(AuthError::InvalidToken("bad signature".into()));
        assert_eq!(expired.to_string(), invalid.to_string());
        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_repo_errors() {
        assert_eq!(
            AppError::from(RepoError::Constraint("dup".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(RepoError::Query("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(RepoError::MissingReference("author".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
