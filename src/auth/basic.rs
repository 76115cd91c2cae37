//! Basic authorization header parsing

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::AuthError;

use super::credentials::Credentials;

const BASIC_SCHEME: &str = "basic";

/// Decode an `Authorization` header value of the form `Basic <base64>`
///
/// The scheme name is matched case-insensitively. The decoded payload must be
/// UTF-8 and contain a `:` separating user and password; the password may
/// itself contain `:`.
pub fn parse_basic_auth(value: &str) -> Result<Credentials, AuthError> {
    let value = value.trim();
    let (scheme, encoded) = value.split_once(' ').ok_or(AuthError::UnsupportedScheme)?;
    if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
        return Err(AuthError::UnsupportedScheme);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuthError::MalformedCredentials(e.to_string()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::MalformedCredentials("credentials are not UTF-8".to_string()))?;

    let (username, password) = decoded.split_once(':').ok_or_else(|| {
        AuthError::MalformedCredentials("missing ':' separator".to_string())
    })?;

    Ok(Credentials::new(username, password))
}

/// Extract Basic credentials from request headers
pub fn credentials_from_headers(headers: &HeaderMap) -> Result<Credentials, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials("header is not ASCII".to_string()))?;
    parse_basic_auth(value)
}
