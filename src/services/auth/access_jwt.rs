use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};

use crate::services::auth::{
    AuthError,
    claims::{self, AccessTokenClaims, ClaimsPolicy, VerifiedAccessToken},
    jwks::KeyStore,
};

/// RS-family access-token verifier backed by the identity provider's key set.
///
/// - `algorithms` is the allow-list; the config layer only admits RSA algorithms,
///   so an `HS256` token signed with a public key as HMAC secret never gets here.
/// - Key material is intentionally not printable via Debug.
#[derive(Debug)]
pub struct AuthService {
    keys: KeyStore,
    algorithms: Vec<Algorithm>,
    policy: ClaimsPolicy,
}

impl AuthService {
    pub fn new(keys: KeyStore, algorithms: Vec<Algorithm>, policy: ClaimsPolicy) -> Self {
        Self {
            keys,
            algorithms,
            policy,
        }
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Check structure, resolve the signing key by `kid` and verify the signature.
    ///
    /// Temporal and identity claims are *not* checked here; see `authenticate`.
    pub async fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
            return Err(AuthError::MalformedToken);
        }

        // The header is the only part read before the signature is checked.
        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            tracing::debug!(error = ?e, "undecodable token header");
            AuthError::MalformedToken
        })?;

        if !self.algorithms.contains(&header.alg) {
            tracing::debug!(alg = ?header.alg, "token algorithm not in allow-list");
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let kid = header.kid.as_deref().ok_or(AuthError::MalformedToken)?;
        let decoding_key = self.keys.find(kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = ?e, "token verification failed");
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                        AuthError::UnsupportedAlgorithm
                    }
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => AuthError::MalformedToken,
                    _ => AuthError::InvalidSignature,
                }
            })?;

        Ok(data.claims)
    }

    /// Verify + validate claims against the configured issuer/audience at `now`.
    ///
    /// This is the recommended entry-point for middleware.
    pub async fn authenticate(
        &self,
        token: &str,
        now: i64,
    ) -> Result<VerifiedAccessToken, AuthError> {
        let claims = self.verify(token).await?;
        claims::validate(&self.policy, claims, now)
    }
}
