#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use coffee_shop_api::{
    app::build_router,
    middleware::http::HttpLimits,
    repos::drink_repo,
    services::auth::{
        AuthService,
        claims::ClaimsPolicy,
        jwks::{KeySource, KeyStore, StaticKeySource},
    },
    state::AppState,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, jwk::JwkSet};
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

pub const ISSUER: &str = "https://coffee-test.us.auth0.com/";
pub const AUDIENCE: &str = "coffeeshop";
pub const KID: &str = "test-key-1";

const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const TRUSTED_KEY: &str = include_str!("../fixtures/trusted_rsa.pem");
const ROGUE_KEY: &str = include_str!("../fixtures/rogue_rsa.pem");

pub struct TestOptions {
    pub key_source: Arc<dyn KeySource>,
    pub algorithms: Vec<Algorithm>,
    pub timeout: Duration,
}

impl Default for TestOptions {
    fn default() -> Self {
        let jwks: JwkSet = serde_json::from_str(JWKS).expect("invalid jwks fixture");
        Self {
            key_source: Arc::new(StaticKeySource::new(jwks)),
            algorithms: vec![Algorithm::RS256],
            timeout: Duration::from_secs(5),
        }
    }
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    pub async fn spawn_with(options: TestOptions) -> Self {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory sqlite");
        drink_repo::ensure_schema(&db)
            .await
            .expect("failed to create schema");

        let keys = KeyStore::new(
            options.key_source,
            Duration::from_secs(600),
            Duration::from_secs(30),
        );
        let auth = AuthService::new(
            keys,
            options.algorithms,
            ClaimsPolicy {
                issuer: ISSUER.into(),
                audience: AUDIENCE.into(),
                leeway_seconds: 0,
            },
        );

        let state = AppState::new(db, Arc::new(auth));
        let router = build_router(
            state,
            HttpLimits {
                timeout: options.timeout,
                body_limit_bytes: 64 * 1024,
            },
        );

        Self { router }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible")
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let res = self.send(req).await;
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestClaims {
    pub iss: String,
    pub sub: String,
    pub aud: Value,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl TestClaims {
    pub fn with_permissions(permissions: &[&str]) -> Self {
        Self {
            iss: ISSUER.into(),
            sub: "auth0|barista".into(),
            aud: Value::from(AUDIENCE),
            exp: now() + 3600,
            nbf: None,
            permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn sign(&self) -> String {
        self.sign_with(TRUSTED_KEY, KID)
    }

    pub fn sign_with_rogue_key(&self) -> String {
        self.sign_with(ROGUE_KEY, KID)
    }

    pub fn sign_with(&self, pem: &str, kid: &str) -> String {
        self.sign_with_alg(Algorithm::RS256, pem, kid)
    }

    pub fn sign_with_alg(&self, alg: Algorithm, pem: &str, kid: &str) -> String {
        let mut header = Header::new(alg);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("valid rsa pem");
        jsonwebtoken::encode(&header, self, &key).expect("token encodes")
    }

    pub fn sign_hs256(&self, secret: &[u8]) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(KID.to_string());
        jsonwebtoken::encode(&header, self, &EncodingKey::from_secret(secret))
            .expect("token encodes")
    }
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn manager_token() -> String {
    TestClaims::with_permissions(&[
        "get:drinks-detail",
        "post:drinks",
        "patch:drinks",
        "delete:drinks",
    ])
    .sign()
}
