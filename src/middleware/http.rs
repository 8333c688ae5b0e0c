/*
 * Responsibility
 * - Request-Id generation + propagation (X-Request-Id)
 * - Access logging / request tracing (TraceLayer)
 * - Body size limits (DefaultBodyLimit; oversized bodies are rejected by the
 *   Json extractor, so they go through AppError like any other body failure)
 * - Global timeouts
 * - Failures raised by these layers use the same JSON error envelope as handlers
 */

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{StatusCode, header::HeaderName};
use axum::response::Response;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::error::error_response;

#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub timeout: Duration,
    pub body_limit_bytes: usize,
}

async fn handle_layer_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        error_response(
            StatusCode::REQUEST_TIMEOUT,
            "request_timeout",
            "Request Timeout".into(),
        )
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            "Internal Server Error".into(),
        )
    }
}

/// Apply HTTP-level middleware to the given Router.
pub fn apply(router: Router, limits: HttpLimits) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(handle_layer_error))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(DefaultBodyLimit::max(limits.body_limit_bytes))
        .layer(TimeoutLayer::new(limits.timeout))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}
