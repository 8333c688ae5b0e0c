/*
 * Responsibility
 * - Claims validation for signature-verified access tokens
 * - Pure computation: the caller supplies `now`, no clock is read here
 */

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::services::auth::AuthError;

/// Decoded access-token payload.
///
/// Only ever produced by `AuthService::verify`, i.e. after the signature checked out.
/// Every claim is optional at the serde level so a missing claim turns into a
/// precise `AuthError` here instead of a generic decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub aud: Option<Audience>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// `aud` in a JWT is either a string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::One(aud) => aud == expected,
            Audience::Many(auds) => auds.iter().any(|aud| aud == expected),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClaimsPolicy {
    pub issuer: String,
    pub audience: String,
    pub leeway_seconds: u64,
}

/// What the rest of the request sees once a token passed verification and validation.
///
/// `permissions` stays `None` when the token carries no `permissions` claim at all,
/// which is a different failure from holding the wrong permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccessToken {
    pub subject: Option<String>,
    pub permissions: Option<BTreeSet<String>>,
}

pub fn validate(
    policy: &ClaimsPolicy,
    claims: AccessTokenClaims,
    now: i64,
) -> Result<VerifiedAccessToken, AuthError> {
    let leeway = i64::try_from(policy.leeway_seconds).unwrap_or(i64::MAX);

    let exp = claims.exp.ok_or(AuthError::MissingClaim("exp"))?;
    if now >= exp.saturating_add(leeway) {
        return Err(AuthError::TokenExpired);
    }

    if let Some(nbf) = claims.nbf
        && now.saturating_add(leeway) < nbf
    {
        return Err(AuthError::TokenNotYetValid);
    }

    let audience_ok = claims
        .aud
        .as_ref()
        .is_some_and(|aud| aud.contains(&policy.audience));
    if !audience_ok {
        return Err(AuthError::InvalidAudience);
    }

    if claims.iss.as_deref() != Some(policy.issuer.as_str()) {
        return Err(AuthError::InvalidIssuer);
    }

    Ok(VerifiedAccessToken {
        subject: claims.sub,
        permissions: claims
            .permissions
            .map(|perms| perms.into_iter().collect()),
    })
}
