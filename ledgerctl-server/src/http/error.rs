//! API error types with IntoResponse
//!
//! Every failure becomes `{ "error": ..., "details"?: ... }` with a status
//! code. Server-side failures are logged and answered with a generic message.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::repos::DbError;
use crate::models::ValidationError;
use crate::storage::StorageError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Malformed request body or query (400)
    BadRequest { message: String, details: Option<String> },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Delete blocked by dependent rows (400)
    Conflict { message: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, details: Option<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } | Self::Conflict { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(e) => ErrorBody {
                error: e.to_string(),
                details: None,
            },
            Self::BadRequest { message, details } => ErrorBody {
                error: message,
                details,
            },
            Self::NotFound { resource, id } => ErrorBody {
                error: format!("{} '{}' not found", resource, id),
                details: None,
            },
            Self::Conflict { message } => ErrorBody {
                error: message,
                details: None,
            },
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                ErrorBody {
                    error: "Internal server error".into(),
                    details: None,
                }
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ErrorBody {
                    error: "Internal server error".into(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { message } => Self::Conflict { message },
            _ => Self::Database(e),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Io(_) => Self::Internal {
                message: e.to_string(),
            },
            _ => Self::bad_request(e.to_string(), None),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid JSON body", Some(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query string", Some(rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request("Expected a multipart/form-data body", Some(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::bad_request("Invalid multipart body", Some(e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "name" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "name cannot be empty");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::NotFound {
            resource: "company",
            id: "abc".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn conflict_is_400_with_message() {
        let err: ApiError = DbError::Conflict {
            message: "Cannot delete company with existing packages (2)".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("existing packages"));
    }

    #[tokio::test]
    async fn database_error_is_generic_500() {
        let err: ApiError = DbError::Sqlx(sqlx::Error::PoolTimedOut).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn bad_request_carries_details() {
        let err = ApiError::bad_request("Invalid JSON body", Some("expected value at line 1".into()));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["details"], "expected value at line 1");
    }

    #[test]
    fn storage_limits_are_client_errors() {
        let err: ApiError = StorageError::TooLarge {
            name: "scan.pdf".into(),
            size: 10,
            max: 5,
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
