/*
 * Responsibility
 * - Public interface of the middleware layer (re-export)
 */
pub mod auth;
pub mod bearer_auth;
pub mod http;
