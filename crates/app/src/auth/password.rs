//! Password hashing and verification.

use std::fmt;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::Zeroizing;

const SALT_BYTES: usize = 16;

/// Accepted password length, in characters.
pub const PASSWORD_LENGTH: std::ops::RangeInclusive<usize> = 6..=255;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    Hash(#[source] password_hash::Error),

    #[error("stored password hash is malformed")]
    MalformedHash(#[source] password_hash::Error),
}

/// A plaintext password, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether the password is non-blank and within [`PASSWORD_LENGTH`].
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        !self.is_blank() && PASSWORD_LENGTH.contains(&self.0.chars().count())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Hash a password into an argon2id PHC string with a fresh random salt.
///
/// # Errors
///
/// Returns an error if argon2 rejects the input or parameters.
pub fn hash_password(password: &Password) -> Result<String, PasswordError> {
    let mut salt = [0_u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);

    let salt = SaltString::encode_b64(&salt).map_err(PasswordError::Hash)?;

    Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Check a password against a stored PHC string.
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed.
pub fn verify_password(password: &Password, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.expose().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(error) => Err(PasswordError::Hash(error)),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn hashed_password_verifies() -> TestResult {
        let password = Password::new("correct horse");
        let hash = hash_password(&password)?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&password, &hash)?);

        Ok(())
    }

    #[test]
    fn wrong_password_does_not_verify() -> TestResult {
        let hash = hash_password(&Password::new("correct horse"))?;

        assert!(!verify_password(&Password::new("battery staple"), &hash)?);

        Ok(())
    }

    #[test]
    fn same_password_gets_distinct_salts() -> TestResult {
        let password = Password::new("correct horse");

        assert_ne!(hash_password(&password)?, hash_password(&password)?);

        Ok(())
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let result = verify_password(&Password::new("whatever"), "plaintext");

        assert!(
            matches!(result, Err(PasswordError::MalformedHash(_))),
            "expected MalformedHash, got {result:?}"
        );
    }

    #[test]
    fn short_and_blank_passwords_are_not_acceptable() {
        assert!(!Password::new("12345").is_acceptable());
        assert!(!Password::new("       ").is_acceptable());
        assert!(!Password::new("x".repeat(256)).is_acceptable());
        assert!(Password::new("123456").is_acceptable());
    }

    #[test]
    fn debug_output_is_redacted() {
        let debug = format!("{:?}", Password::new("hunter22"));

        assert!(!debug.contains("hunter22"));
    }
}
