/*
 * Responsibility
 * - App-wide AppError definition
 * - IntoResponse (HTTP status / JSON error envelope)
 * - Convert repo errors / body rejections / auth errors into one envelope
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

/// `{ "success": false, "error": 404, "code": "not_found", "message": "Not Found" }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub code: &'static str,
    pub message: String,
}

pub fn error_response(status: StatusCode, code: &'static str, message: String) -> Response {
    let body = ErrorResponse {
        success: false,
        error: status.as_u16(),
        code,
        message,
    };

    (status, Json(body)).into_response()
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest(reason.into())
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound(reason.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The reason strings are for logs only; clients get the fixed messages below.
        let (status, code, message) = match self {
            AppError::BadRequest(reason) => {
                tracing::debug!(%reason, "bad request");
                (StatusCode::BAD_REQUEST, "bad_request", "Bad Request")
            }
            AppError::NotFound(reason) => {
                tracing::debug!(%reason, "not found");
                (StatusCode::NOT_FOUND, "not_found", "Not Found")
            }
            AppError::Unprocessable(reason) => {
                tracing::debug!(%reason, "unprocessable");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "unprocessable",
                    "unprocessable",
                )
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Payload Too Large",
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                "Method Not Allowed",
            ),
            AppError::Auth(err) => return err.into_response(),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_server_error",
                "Internal Server Error",
            ),
        };

        error_response(status, code, message.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::Unprocessable("title already exists".into()),
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "persistence failure");
                AppError::Internal
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        // Bodies over `DefaultBodyLimit` surface here as a buffering failure.
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    // `/drinks/abc` never names a drink.
    fn from(e: PathRejection) -> Self {
        AppError::NotFound(e.body_text())
    }
}
