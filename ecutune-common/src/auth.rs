//! Admin API token verification
//!
//! The admin routes (lead review, catalog stats) are protected by a single
//! bearer token taken from configuration.
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions.
//! No HTTP framework dependencies (Axum, etc.) - the middleware lives in ecutune-web.

use sha2::{Digest, Sha256};

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAuthError {
    /// No admin token configured; admin API is unavailable
    Disabled,

    /// `Authorization` header missing or not a bearer token
    MissingToken,

    /// Token does not match the configured one
    InvalidToken,
}

impl std::fmt::Display for AdminAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminAuthError::Disabled => write!(f, "Admin API disabled (no admin token configured)"),
            AdminAuthError::MissingToken => write!(f, "Missing bearer token"),
            AdminAuthError::InvalidToken => write!(f, "Invalid admin token"),
        }
    }
}

impl std::error::Error for AdminAuthError {}

/// SHA-256 digest of a token as 64 hex characters
///
/// # Examples
///
/// ```
/// use ecutune_common::auth::token_digest;
///
/// let digest = token_digest("s3cret");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, token_digest("s3cret"));
/// ```
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// Scheme matching is case-insensitive. Scheme and token may be separated by
/// any whitespace; surrounding whitespace is ignored.
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verify a presented token against the configured admin token digest
///
/// `expected_digest` is `None` when no admin token is configured.
/// Comparison happens on digests, so timing does not depend on where the
/// raw tokens first differ.
pub fn verify_admin_token(
    expected_digest: Option<&str>,
    authorization: Option<&str>,
) -> Result<(), AdminAuthError> {
    let expected = expected_digest.ok_or(AdminAuthError::Disabled)?;

    let token = authorization
        .and_then(parse_bearer)
        .ok_or(AdminAuthError::MissingToken)?;

    let provided = token_digest(token);
    let matches = provided
        .bytes()
        .zip(expected.bytes())
        .fold(provided.len() == expected.len(), |acc, (a, b)| acc & (a == b));

    if matches {
        Ok(())
    } else {
        Err(AdminAuthError::InvalidToken)
    }
}
