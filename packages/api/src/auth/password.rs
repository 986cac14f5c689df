//! # Password hashing and verification with Argon2id
//!
//! - [`hash_password`] generates a random salt via [`OsRng`] and returns a
//!   PHC-format string (`$argon2id$v=19$m=19456,t=2,p=1$...`), stored in
//!   `users.password_hash`.
//! - [`verify_password`] parses a stored hash and checks a plaintext against
//!   it. A mismatch is `Ok(false)`; a malformed hash is an error.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::ApiError;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ApiError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
