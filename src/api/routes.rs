/*
 * Responsibility
 * - URL structure of the API
 * - Which route needs which permission is decided here, per method
 * - Unmatched paths / methods still answer with the JSON error envelope
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    fallback::{method_not_allowed, not_found},
    health::health,
};
use crate::middleware::auth::permission::{
    self, DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS,
};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/drinks", get(list_drinks))
        .route(
            "/drinks",
            permission::require(state, POST_DRINKS, post(create_drink)),
        )
        .route(
            "/drinks-detail",
            permission::require(state, GET_DRINKS_DETAIL, get(list_drinks_detail)),
        )
        .route(
            "/drinks/{id}",
            permission::require(state, PATCH_DRINKS, patch(update_drink)),
        )
        .route(
            "/drinks/{id}",
            permission::require(state, DELETE_DRINKS, delete(delete_drink)),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}
