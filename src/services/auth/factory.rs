/*
 * Responsibility
 * - Build AuthService (HTTP key source + claims policy) from Config
 */
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    AuthService,
    claims::ClaimsPolicy,
    jwks::{HttpKeySource, KeySourceError, KeyStore},
};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, KeySourceError> {
    let source = HttpKeySource::new(config.auth_jwks_url.clone())?;
    let keys = KeyStore::new(
        Arc::new(source),
        config.jwks_cache_ttl,
        config.jwks_min_refresh,
    );

    let policy = ClaimsPolicy {
        issuer: config.auth_issuer.clone(),
        audience: config.auth_audience.clone(),
        leeway_seconds: config.access_token_leeway_seconds,
    };

    Ok(Arc::new(AuthService::new(
        keys,
        config.auth_algorithms.clone(),
        policy,
    )))
}
