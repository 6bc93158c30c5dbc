//! Salted one-way password hashing.
//!
//! Hashes are argon2id in PHC string format, so the salt and parameters travel with the hash and `verify_password`
//! needs nothing else. Both functions are CPU-bound and slow on purpose. Call them off the async workers.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::traits::AccountApiError;

pub fn hash_password(password: &str) -> Result<String, AccountApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountApiError::PasswordHashError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Returns `Ok(false)` when the password does not match. A hash that cannot be parsed is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AccountApiError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AccountApiError::PasswordHashError(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AccountApiError::PasswordHashError(e.to_string())),
    }
}
