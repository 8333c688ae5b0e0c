/*
 * Responsibility
 * - Authorization failures raised by the bearer parser, the verifier, the claims
 *   validator and the permission gate
 * - Each variant owns exactly one HTTP status and one stable machine-readable code
 * - Rendered once, at the boundary (IntoResponse); jsonwebtoken error text is
 *   logged by the caller and never reaches the body
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::error_response;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,
    #[error("Authorization header must be of the form 'Bearer <token>'.")]
    MalformedHeader,
    #[error("Unable to parse authentication token.")]
    MalformedToken,
    #[error("Token signing algorithm is not accepted.")]
    UnsupportedAlgorithm,
    #[error("Unable to find the appropriate key.")]
    UnknownKey,
    #[error("Token signature could not be verified.")]
    InvalidSignature,
    #[error("Token is missing the '{0}' claim.")]
    MissingClaim(&'static str),
    #[error("Token expired.")]
    TokenExpired,
    #[error("Token is not valid yet.")]
    TokenNotYetValid,
    #[error("Incorrect audience, please check the audience.")]
    InvalidAudience,
    #[error("Incorrect issuer, please check the issuer.")]
    InvalidIssuer,
    #[error("Permissions not included in JWT.")]
    PermissionsMissing,
    #[error("Permission not found.")]
    Unauthorized,
    #[error("Signing keys are unavailable.")]
    KeysUnavailable,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::FORBIDDEN,
            AuthError::KeysUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader => "invalid_header",
            AuthError::MalformedToken => "invalid_token",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::UnknownKey => "unknown_key",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::MissingClaim(_) | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::Unauthorized => "unauthorized",
            AuthError::KeysUnavailable => "keys_unavailable",
        }
    }

    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.error_code(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_failures_keep_distinct_statuses() {
        assert_eq!(
            AuthError::PermissionsMissing.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::Unauthorized.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn verification_failures_are_unauthorized() {
        for err in [
            AuthError::MissingHeader,
            AuthError::MalformedHeader,
            AuthError::MalformedToken,
            AuthError::UnsupportedAlgorithm,
            AuthError::UnknownKey,
            AuthError::InvalidSignature,
            AuthError::MissingClaim("exp"),
            AuthError::TokenExpired,
            AuthError::TokenNotYetValid,
            AuthError::InvalidAudience,
            AuthError::InvalidIssuer,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{err:?}");
        }
    }
}
