//! Session token signing and verification.
//!
//! Tokens are HS256 JWTs carrying the user identifier and email. Authorities
//! are deliberately left out: they are reloaded from storage on every
//! request so role changes apply immediately.

use std::fmt;

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::users::records::{UserRecord, UserUuid};

/// Default session lifetime in seconds.
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token rejected")]
    Rejected(#[source] jsonwebtoken::errors::Error),

    #[error("token lifetime out of range")]
    LifetimeOutOfRange,
}

/// HMAC signing secret, wiped from memory on drop.
#[derive(Clone)]
pub struct JwtSecret(Zeroizing<Vec<u8>>);

impl JwtSecret {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(**redacted**)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserUuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenSigner {
    /// Build a signer for the given secret and session lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::LifetimeOutOfRange`] when the lifetime does not
    /// fit a signed timestamp offset.
    pub fn new(secret: &JwtSecret, ttl_seconds: u64) -> Result<Self, TokenError> {
        let ttl_seconds = i64::try_from(ttl_seconds)
            .ok()
            .ok_or(TokenError::LifetimeOutOfRange)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(&secret.0),
            decoding: DecodingKey::from_secret(&secret.0),
            validation,
            ttl_seconds,
        })
    }

    /// Issue a token for `user`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn sign(&self, user: &UserRecord) -> Result<String, TokenError> {
        self.sign_at(user.uuid, &user.email, Timestamp::now())
    }

    pub(crate) fn sign_at(
        &self,
        user: UserUuid,
        email: &str,
        issued_at: Timestamp,
    ) -> Result<String, TokenError> {
        let iat = issued_at.as_second();
        let exp = iat
            .checked_add(self.ttl_seconds)
            .ok_or(TokenError::LifetimeOutOfRange)?;

        let claims = Claims {
            sub: user,
            email: email.to_string(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Check the signature and expiry of a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Rejected`] for malformed, tampered or expired
    /// tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Rejected)
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}
