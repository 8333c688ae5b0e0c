/*
 * Responsibility
 * - Pull the bearer token out of the Authorization header (extract -> shape check -> reject)
 * - Signature / claims checks live in services::auth
 */
use axum::http::HeaderValue;

use crate::services::auth::AuthError;

/// `Authorization: Bearer <token>`: exactly two parts separated by a single space,
/// scheme spelled `Bearer`.
pub fn extract_bearer(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &'static str) -> Result<String, AuthError> {
        let value = HeaderValue::from_static(raw);
        extract_bearer(Some(&value)).map(str::to_owned)
    }

    #[test]
    fn missing_header() {
        assert_eq!(extract_bearer(None), Err(AuthError::MissingHeader));
    }

    #[test]
    fn well_formed_header_yields_token() {
        assert_eq!(parse("Bearer abc.def.ghi"), Ok("abc.def.ghi".to_string()));
    }

    #[test]
    fn malformed_headers() {
        for raw in [
            "abc.def.ghi",
            "Bearer",
            "Bearer ",
            "Bearer  abc",
            "Bearer abc def",
            "Basic dXNlcjpwYXNz",
            "bearer abc.def.ghi",
        ] {
            assert_eq!(parse(raw), Err(AuthError::MalformedHeader), "{raw:?}");
        }
    }
}
