use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// ApiResponse
///
/// The success envelope returned by every handler: `{status, data, message, success}`.
/// Handlers return the typed envelope so tests can inspect `data` without decoding JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            data,
            message: message.into(),
            success: status.is_success(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
