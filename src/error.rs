//! API error taxonomy and the JSON error envelope.
//!
//! Every failure leaves the store unchanged: handlers validate and authorize
//! before mutating, and conditional writes surface races as conflicts.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // State-machine and uniqueness conflicts answer 400, not 409.
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

/// Maps a unique-constraint failure (SQLSTATE 23505) to a conflict with the
/// given message; anything else stays an internal error. Used where the store
/// enforces an invariant such as the single-pending-request index.
pub fn on_duplicate(err: sqlx::Error, message: &str) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            ApiError::conflict(message)
        }
        _ => ApiError::from(err),
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            ApiError::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            ApiError::NotFound(m)
            | ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::Conflict(m) => (m, None),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "unhandled error");
                ("Server error".to_string(), None)
            }
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::validation_field("name", "Name is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("User not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::unauthorized("Missing token").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::forbidden("Not yours").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::conflict("Already pending").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_response_names_fields() {
        let err = ApiError::Validation(vec![
            FieldError::new("skillsOffered", "At least one skill offered is required"),
            FieldError::new("message", "Message cannot be more than 500 characters"),
        ]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_hides_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("secret connection string"));
        let body = match &err {
            ApiError::Internal(_) => "Server error",
            _ => unreachable!(),
        };
        assert_eq!(body, "Server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn field_error_serializes_field_and_message() {
        let err = FieldError::new("rating", "Rating must be between 1 and 5");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "rating");
        assert_eq!(json["message"], "Rating must be between 1 and 5");
    }
}
