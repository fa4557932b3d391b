//! HTTP error responses

use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Unified error type for HTTP responses
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Parse(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::QueueFull | Error::QueueClosed => {
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()),
        };

        error!("Webhook failed: {}", self.0);

        let body = serde_json::json!({ "message": message });
        (status, axum::Json(body)).into_response()
    }
}
