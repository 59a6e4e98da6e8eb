//! Short hash generation and validation utilities.
//!
//! Provides cryptographically secure random hash generation, validation for
//! user-provided custom hashes and a cheap format check for the redirect path.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of random bytes before base64 encoding.
const HASH_LENGTH_BYTES: usize = 9;

/// Upper bound for any hash accepted on the redirect path.
const MAX_HASH_LENGTH: usize = 64;

/// Hashes that cannot be used as short links.
///
/// These collide with system routes.
const RESERVED_HASHES: &[&str] = &["api", "health", "metrics", "admin"];

/// Generates a cryptographically secure random short hash.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing a 12-character hash.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_hash() -> Result<String, AppError> {
    let mut buffer = [0u8; HASH_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Returns true if `hash` only uses the URL-safe alphabet and has a sane length.
///
/// Generated and custom hashes always pass this check.
pub fn is_well_formed(hash: &str) -> bool {
    !hash.is_empty()
        && hash.len() <= MAX_HASH_LENGTH
        && hash
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validates a user-provided custom hash.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens, underscores
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved system path
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any validation rule is violated.
pub fn validate_custom_hash(hash: &str) -> Result<(), AppError> {
    if hash.len() < 4 || hash.len() > 32 {
        return Err(AppError::bad_request(
            "Custom hash must be 4-32 characters",
            json!({ "provided_length": hash.len() }),
        ));
    }

    if !is_well_formed(hash) {
        return Err(AppError::bad_request(
            "Custom hash can only contain letters, digits, hyphens and underscores",
            json!({ "hash": hash }),
        ));
    }

    if hash.starts_with('-') || hash.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom hash cannot start or end with a hyphen",
            json!({ "hash": hash }),
        ));
    }

    if RESERVED_HASHES.contains(&hash.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This hash is reserved",
            json!({ "hash": hash }),
        ));
    }

    Ok(())
}
