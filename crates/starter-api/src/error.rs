//! # API Errors
//!
//! JSON error bodies for the `/api` routes. Every error renders as
//! `{"error": "..."}`, the same shape as a failed checkout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use starter_core::StarterError;

/// Body returned when a checkout request lacks a positive price or a product name
pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";

/// Body returned when a JSON payload cannot be parsed
pub const INVALID_REQUEST_BODY: &str = "Invalid request body";

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way to becoming an HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<StarterError> for ApiError {
    fn from(err: StarterError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.public_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
