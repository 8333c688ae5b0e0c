/*
 * Responsibility
 * - Load settings from the environment (DATABASE_URL, issuer/audience, JWKS, limits)
 * - Validate settings up front (refuse to start when something is missing)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_jwks_url: String,
    pub auth_algorithms: Vec<Algorithm>,
    pub access_token_leeway_seconds: u64,

    pub jwks_cache_ttl: Duration,
    pub jwks_min_refresh: Duration,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

impl Config {
    /// Reads the process environment; `app::run` loads `.env` into it beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://database.db?mode=rwc".to_string());

        let app_env = AppEnv::from_env();

        let auth_issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let auth_jwks_url = std::env::var("AUTH_JWKS_URL")
            .unwrap_or_else(|_| default_jwks_url(&auth_issuer));
        validate_jwks_url(&auth_jwks_url, app_env)?;

        let auth_algorithms = parse_algorithms(
            &std::env::var("AUTH_ALGORITHMS").unwrap_or_else(|_| "RS256".to_string()),
        )?;

        let access_token_leeway_seconds = env_u64("ACCESS_TOKEN_LEEWAY_SECONDS", 0);
        let jwks_cache_ttl = Duration::from_secs(env_u64("JWKS_CACHE_TTL_SECONDS", 600));
        let jwks_min_refresh = Duration::from_secs(env_u64("JWKS_MIN_REFRESH_SECONDS", 30));
        let request_timeout = Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECONDS", 30));

        let request_body_limit_bytes = std::env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            database_url,
            app_env,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            auth_algorithms,
            access_token_leeway_seconds,
            jwks_cache_ttl,
            jwks_min_refresh,
            request_timeout,
            request_body_limit_bytes,
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

/// `https://tenant.auth0.com/` -> `https://tenant.auth0.com/.well-known/jwks.json`
pub fn default_jwks_url(issuer: &str) -> String {
    format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
}

fn validate_jwks_url(raw: &str, app_env: AppEnv) -> Result<(), ConfigError> {
    let url = url::Url::parse(raw).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;
    match url.scheme() {
        "https" => Ok(()),
        // Local identity providers (docker, mocks) are usually plain http.
        "http" if !app_env.is_production() => Ok(()),
        _ => Err(ConfigError::Invalid("AUTH_JWKS_URL")),
    }
}

/// Parse the comma-separated algorithm allow-list. Only RSA-family algorithms are
/// accepted so a symmetric algorithm can never be configured as trusted.
pub fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg =
            Algorithm::from_str(name).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS"))?;
        if !is_rsa_family(alg) {
            return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
        }
        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
    }

    Ok(algorithms)
}

pub fn is_rsa_family(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwks_url_is_derived_from_issuer() {
        assert_eq!(
            default_jwks_url("https://dev-coffee.us.auth0.com/"),
            "https://dev-coffee.us.auth0.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn algorithm_allow_list_accepts_rsa_only() {
        assert_eq!(
            parse_algorithms("RS256, PS512").unwrap(),
            vec![Algorithm::RS256, Algorithm::PS512]
        );
        assert_eq!(
            parse_algorithms("RS256,HS256"),
            Err(ConfigError::Invalid("AUTH_ALGORITHMS"))
        );
        assert_eq!(
            parse_algorithms(" , "),
            Err(ConfigError::Invalid("AUTH_ALGORITHMS"))
        );
    }

    #[test]
    fn plain_http_jwks_is_rejected_in_production() {
        assert!(validate_jwks_url("http://localhost:8080/jwks", AppEnv::Development).is_ok());
        assert_eq!(
            validate_jwks_url("http://localhost:8080/jwks", AppEnv::Production),
            Err(ConfigError::Invalid("AUTH_JWKS_URL"))
        );
    }
}
