//! Password hashing and verification with bcrypt.

use std::sync::OnceLock;

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

static TIMING_GUARD_HASH: OnceLock<Option<String>> = OnceLock::new();

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(AppError::internal)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed).map_err(AppError::internal)
}

/// Spends the same bcrypt work as a real verification and always returns `false`.
///
/// Used when an account has no usable hash so that response timing does not tell
/// unknown or disabled accounts apart from a wrong password.
pub fn verify_against_dummy(password: &str) -> bool {
    let guard = TIMING_GUARD_HASH.get_or_init(|| hash("masnaa-timing-guard", DEFAULT_COST).ok());
    if let Some(hashed) = guard {
        let _ = verify(password, hashed);
    }
    false
}
