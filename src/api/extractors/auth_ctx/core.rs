use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::auth::AuthError;
use crate::state::AppState;

use super::AuthCtx;

/// Extractor that hands the AuthCtx to a handler.
/// Assumes the permission gate already inserted AuthCtx into request.extensions().
/// Missing means the route was not gated; answer 401 instead of running unprotected.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or_else(|| {
                tracing::error!(path = %parts.uri.path(), "handler reached without permission gate");
                AuthError::MissingHeader
            })
    }
}
