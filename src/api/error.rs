//! HTTP mapping of internal failures.

use crate::core::UpdateError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// An error no endpoint has a domain-level answer for
#[derive(Debug)]
pub struct ApiError(pub UpdateError);

impl From<UpdateError> for ApiError {
    fn from(err: UpdateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match &self.0 {
            UpdateError::Database(_) | UpdateError::Migration(_) => {
                ("DATABASE_ERROR", "Database operation failed".to_string())
            }
            UpdateError::Io(_) => ("IO_ERROR", "IO operation failed".to_string()),
            other => ("INTERNAL_ERROR", other.to_string()),
        };

        tracing::error!(error = %self.0, code = code, "Request error");

        let body = Json(json!({
            "code": code,
            "message": message,
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
