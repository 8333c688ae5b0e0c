/*
 * Responsibility
 * - GET /health (liveness)
 * - Sits outside the permission gate
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
