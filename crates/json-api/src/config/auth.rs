//! Auth Config

use clap::Args;
use tienda_app::auth::{JwtSecret, token::DEFAULT_TOKEN_TTL_SECONDS};

/// Session token settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    #[arg(long, env = "JWT_TTL_SECONDS", default_value_t = DEFAULT_TOKEN_TTL_SECONDS)]
    pub jwt_ttl_seconds: u64,
}

impl AuthConfig {
    /// Wrap the configured secret so it is redacted and zeroized.
    #[must_use]
    pub fn secret(&self) -> JwtSecret {
        JwtSecret::new(self.jwt_secret.as_bytes())
    }
}
