/*
 * Responsibility
 * - Drink menu API guarded by bearer-token (JWT/JWKS) permission checks
 * - Library root; the binary only calls app::run()
 */

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
