/*
 * Responsibility
 * - Where the signing key set (JWKS) comes from (KeySource)
 * - The time-boxed cache the verifier reads keys from (KeyStore)
 */
use async_trait::async_trait;
use jsonwebtoken::{
    DecodingKey,
    jwk::{AlgorithmParameters, JwkSet},
};
use std::{collections::HashMap, fmt, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};

use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("jwks request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("jwks source unavailable: {0}")]
    Unavailable(String),
}

/// Where the identity provider's public keys come from.
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    // Backend name (for logging).
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<JwkSet, KeySourceError>;
}

/// Fetches `/.well-known/jwks.json` from the identity provider.
#[derive(Clone, Debug)]
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        let set = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        Ok(set)
    }
}

/// A fixed key set (local development, tests).
#[derive(Clone, Debug)]
pub struct StaticKeySource {
    keys: JwkSet,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        Ok(self.keys.clone())
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

impl CachedKeys {
    // Only RSA keys with a `kid` are usable; everything else is treated as absent.
    fn from_set(set: &JwkSet, fetched_at: Instant) -> Self {
        let keys = set
            .keys
            .iter()
            .filter(|jwk| matches!(jwk.algorithm, AlgorithmParameters::RSA(_)))
            .filter_map(|jwk| {
                let kid = jwk.common.key_id.clone()?;
                match DecodingKey::from_jwk(jwk) {
                    Ok(key) => Some((kid, key)),
                    Err(err) => {
                        tracing::warn!(kid = %kid, error = ?err, "skipping unusable jwk");
                        None
                    }
                }
            })
            .collect();

        Self { keys, fetched_at }
    }
}

/// Time-boxed key cache.
///
/// - Fresh entries (younger than `ttl`) are served without touching the source.
/// - A `kid` that is not cached (or a stale cache) forces one refresh before
///   failing with `UnknownKey`. Refreshes are spaced at least `min_refresh` apart
///   so a flood of bogus `kid`s cannot hammer the identity provider.
/// - Only one refresh runs at a time, and the fetch happens without holding the
///   cache lock: lookups keep being answered from the current set meanwhile.
/// - If the source fails, a previously fetched set keeps being served; with no
///   set at all the verifier fails closed (`KeysUnavailable`).
pub struct KeyStore {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    min_refresh: Duration,
    current: RwLock<Option<CachedKeys>>,
    // single-flight guard; holds the time of the last fetch attempt
    refresh: Mutex<Option<Instant>>,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("source", &self.source.name())
            .field("ttl", &self.ttl)
            .field("min_refresh", &self.min_refresh)
            .finish()
    }
}

impl KeyStore {
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration, min_refresh: Duration) -> Self {
        Self {
            source,
            ttl,
            min_refresh,
            current: RwLock::new(None),
            refresh: Mutex::new(None),
        }
    }

    /// Fetch once up front. Returns the number of usable keys.
    pub async fn prime(&self) -> Result<usize, KeySourceError> {
        let mut last_attempt = self.refresh.lock().await;
        let now = Instant::now();
        *last_attempt = Some(now);

        let set = self.source.fetch().await?;
        let cached = CachedKeys::from_set(&set, now);
        let count = cached.keys.len();
        *self.current.write().await = Some(cached);

        Ok(count)
    }

    pub async fn find(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.fresh_key(kid).await {
            return Ok(key);
        }

        self.refresh_and_find(kid).await
    }

    async fn fresh_key(&self, kid: &str) -> Option<DecodingKey> {
        let current = self.current.read().await;
        current
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .and_then(|cached| cached.keys.get(kid).cloned())
    }

    async fn refresh_and_find(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let mut last_attempt = self.refresh.lock().await;

        // Another request may have refreshed while we waited for the guard.
        if let Some(key) = self.fresh_key(kid).await {
            return Ok(key);
        }

        let may_refresh = last_attempt.is_none_or(|at| at.elapsed() >= self.min_refresh);

        if may_refresh {
            let now = Instant::now();
            *last_attempt = Some(now);

            match self.source.fetch().await {
                Ok(set) => {
                    let cached = CachedKeys::from_set(&set, now);
                    tracing::info!(
                        source = self.source.name(),
                        keys = cached.keys.len(),
                        "signing keys refreshed"
                    );
                    *self.current.write().await = Some(cached);
                }
                Err(err) => {
                    tracing::error!(source = self.source.name(), error = %err, "signing key fetch failed");
                }
            }
        }
        drop(last_attempt);

        let current = self.current.read().await;
        let cached = current.as_ref().ok_or(AuthError::KeysUnavailable)?;
        cached.keys.get(kid).cloned().ok_or(AuthError::UnknownKey)
    }
}
