/*
 * Responsibility
 * - Answer unmatched paths (404) and unsupported methods (405) with the error envelope
 */
use axum::http::Uri;

use crate::error::AppError;

pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("no route for {}", uri.path()))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
