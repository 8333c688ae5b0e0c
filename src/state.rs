/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - db: SqlitePool, auth: AuthService
 * - Meant to be cloned (everything inside is Arc / cheap to clone)
 */
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::auth::AuthService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: SqlitePool, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }
}
