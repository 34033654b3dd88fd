//! Error responses for the HTTP surface.
//!
//! # Design Decisions
//! - Diagnostic failures carry full detail; they are non-sensitive
//! - Token failures return a fixed message; the cause stays in the logs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::session::TokenIssuanceError;

/// Failures a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("IP check failed: {0}")]
    CheckIp(#[from] DispatchError),

    #[error("Token generation failed: {0}")]
    Token(#[from] TokenIssuanceError),

    #[error("Malformed request body: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::CheckIp(e) => {
                tracing::error!(error = %e, "IP check error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Failed to check IP", "details": e.to_string()})),
                )
                    .into_response()
            }
            ApiError::Token(e) => {
                tracing::error!(error = %e, "Token generation error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Failed to generate token"})),
                )
                    .into_response()
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Malformed request body", "details": message})),
            )
                .into_response(),
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))).into_response()
            }
        }
    }
}
