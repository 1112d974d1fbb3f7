//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, JwtSecret, PgAuthService, TokenSigner, token::TokenError},
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        products::{PgProductsService, ProductsService},
        users::{PgUsersService, UsersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),

    #[error("JWT secret must not be empty")]
    EmptyJwtSecret,

    #[error("invalid session token settings")]
    Token(#[source] TokenError),
}

/// Settings needed to wire the services together.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub run_migrations: bool,
    pub jwt_secret: JwtSecret,
    pub jwt_ttl_seconds: u64,
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub users: Arc<dyn UsersService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Connect to the database and build every service.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection or migrations fail, or when the
    /// token settings are unusable.
    pub async fn from_settings(settings: &AppSettings) -> Result<Self, AppInitError> {
        if settings.jwt_secret.is_empty() {
            return Err(AppInitError::EmptyJwtSecret);
        }

        let signer = TokenSigner::new(&settings.jwt_secret, settings.jwt_ttl_seconds)
            .map_err(AppInitError::Token)?;

        let pool = database::connect(&settings.database_url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        let db = Db::new(pool);

        Ok(Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            users: Arc::new(PgUsersService::new(db.clone())),
            auth: Arc::new(PgAuthService::new(db, signer)),
        })
    }
}
