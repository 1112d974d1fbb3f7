//! Auth service errors.

use sqlx::Error;
use thiserror::Error;

use crate::auth::{password::PasswordError, token::TokenError};

#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// Unknown email, wrong password, bad token or a user that no longer exists.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password verification failed")]
    Password(#[from] PasswordError),

    #[error("token processing error")]
    Token(#[from] TokenError),

    #[error("storage error")]
    Sql(#[from] Error),
}
