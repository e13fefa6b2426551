// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from relay errors to JSON HTTP responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use telerelay_core::TelerelayError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// A handler failure, rendered as `{error}` with the matching status code.
#[derive(Debug)]
pub struct ApiError(pub TelerelayError);

impl From<TelerelayError> for ApiError {
    fn from(err: TelerelayError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TelerelayError::InvalidRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(TelerelayError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            TelerelayError::RoomNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new(self.0.to_string()))
            }
            err if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string()))
            }
            err => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error".to_string(),
                        details: Some(err.to_string()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// The 404 body for unknown routes.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
}
