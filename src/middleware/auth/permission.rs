/*
 * Responsibility
 * - Permission gate: bearer token -> signature -> claims -> one required permission
 *   -> AuthCtx into request extensions
 * - require(state, permission, handler) wraps any MethodRouter, whatever the
 *   handler's extractors are
 *
 * Notes
 * - Verification and validation are delegated to services::auth every time the
 *   gate is reached; nothing is cached per token
 * - Usage: .route("/drinks", permission::require(&state, POST_DRINKS, post(create_drink)))
 */

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::extractors::AuthCtx;
use crate::middleware::bearer_auth::extract_bearer;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

#[derive(Clone)]
struct Gate {
    auth: Arc<AuthService>,
    permission: &'static str,
}

/// Wrap `handler` so it only runs for tokens granting `permission`.
pub fn require(
    state: &AppState,
    permission: &'static str,
    handler: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let gate = Gate {
        auth: state.auth.clone(),
        permission,
    };

    // route_layer: only the methods registered on `handler` are gated.
    handler.route_layer(middleware::from_fn_with_state(gate, permission_middleware))
}

async fn permission_middleware(
    State(gate): State<Gate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_ctx = authorize(
        &gate.auth,
        req.headers().get(header::AUTHORIZATION),
        gate.permission,
    )
    .await
    .inspect_err(|err| {
        tracing::warn!(
            code = err.error_code(),
            permission = gate.permission,
            method = %req.method(),
            path = %req.uri().path(),
            "authorization failed"
        );
    })?;

    // middleware -> extractor
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

/// The whole pipeline for one request, without the axum plumbing.
pub async fn authorize(
    auth: &AuthService,
    authorization: Option<&HeaderValue>,
    permission: &str,
) -> Result<AuthCtx, AuthError> {
    let token = extract_bearer(authorization)?;
    let now = chrono::Utc::now().timestamp();

    let auth_ctx = AuthCtx::from(auth.authenticate(token, now).await?);
    check_permission(&auth_ctx, permission)?;

    Ok(auth_ctx)
}

pub fn check_permission(auth_ctx: &AuthCtx, permission: &str) -> Result<(), AuthError> {
    if !auth_ctx.has_permissions_claim() {
        return Err(AuthError::PermissionsMissing);
    }
    if !auth_ctx.has_permission(permission) {
        return Err(AuthError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(permissions: Option<&[&str]>) -> AuthCtx {
        AuthCtx {
            subject: Some("auth0|manager".into()),
            permissions: permissions.map(|p| p.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn granted_permission_passes() {
        let c = ctx(Some(&[GET_DRINKS_DETAIL, POST_DRINKS]));
        assert_eq!(check_permission(&c, POST_DRINKS), Ok(()));
    }

    #[test]
    fn missing_claim_is_a_bad_request_not_forbidden() {
        assert_eq!(
            check_permission(&ctx(None), POST_DRINKS),
            Err(AuthError::PermissionsMissing)
        );
    }

    #[test]
    fn insufficient_or_empty_scope_is_forbidden() {
        assert_eq!(
            check_permission(&ctx(Some(&[GET_DRINKS_DETAIL])), DELETE_DRINKS),
            Err(AuthError::Unauthorized)
        );
        assert_eq!(
            check_permission(&ctx(Some(&[])), PATCH_DRINKS),
            Err(AuthError::Unauthorized)
        );
    }
}
