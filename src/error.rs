use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Result alias used by every handler.
pub type ApiResult<T> = Result<T, ApiError>;

/// ApiError
///
/// The fixed error taxonomy of the API. Every failure a handler can produce is
/// mapped onto one of these variants, which in turn map onto exactly one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed id, missing field or missing file.
    #[error("{0}")]
    InvalidInput(String),

    /// The caller is not the owner of the entity.
    #[error("{0}")]
    PermissionDenied(String),

    /// The referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Media upload failed or timed out.
    #[error("media storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Maps a failed write that referenced another entity. A vanished reference
    /// (no row returned, or a foreign key violation, SQLSTATE 23503) becomes
    /// `NotFound(message)`; anything else stays a database error.
    pub fn from_db(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound(message.into()),
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::NotFound(message.into())
            }
            _ => Self::Database(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorBody
///
/// Mirrors the success envelope so that clients can parse both shapes with one type.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    data: Option<()>,
    message: String,
    success: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Upstream failures are logged in full but never echoed to the client.
        let message = match &self {
            ApiError::Storage(e) => {
                tracing::error!("Media storage error: {}", e);
                "Failed to upload media, please try again".to_string()
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            status: status.as_u16(),
            data: None,
            message,
            success: false,
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
            ApiError::invalid_input("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::permission_denied("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StorageError::Timeout).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_reference_maps_to_not_found() {
        let err = ApiError::from_db(sqlx::Error::RowNotFound, "Video not found");
        assert!(matches!(&err, ApiError::NotFound(m) if m == "Video not found"));

        let err = ApiError::from_db(sqlx::Error::PoolTimedOut, "Video not found");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn database_details_are_not_leaked() {
        let response =
            ApiError::from(sqlx::Error::Protocol("secret detail".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 500);
        assert!(body["data"].is_null());
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }
}
