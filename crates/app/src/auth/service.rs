//! Auth service.

use std::collections::BTreeSet;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        AuthServiceError,
        password::{Password, verify_password},
        token::TokenSigner,
    },
    database::Db,
    domain::users::{
        authorities_for,
        records::{UserRecord, UserUuid},
        repository::PgUsersRepository,
    },
};

/// Login request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: Password,
}

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub user: UserRecord,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_uuid: UserUuid,
    pub email: String,
    pub authorities: BTreeSet<String>,
}

impl Principal {
    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    #[must_use]
    pub fn has_any_authority(&self, authorities: &[&str]) -> bool {
        authorities
            .iter()
            .any(|authority| self.has_authority(authority))
    }
}

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    users: PgUsersRepository,
    signer: TokenSigner,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, signer: TokenSigner) -> Self {
        Self {
            db,
            users: PgUsersRepository::new(),
            signer,
        }
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    #[instrument(skip(self, credentials), err)]
    async fn login(&self, credentials: Credentials) -> Result<LoginSession, AuthServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let user = self
            .users
            .find_user_by_email(&mut tx, credentials.email.trim())
            .await?;

        tx.commit().await?;

        let Some(user) = user else {
            debug!("login for unknown email");

            return Err(AuthServiceError::InvalidCredentials);
        };

        if !verify_password(&credentials.password, &user.password_hash)? {
            debug!(user = %user.uuid, "login with wrong password");

            return Err(AuthServiceError::InvalidCredentials);
        }

        let token = self.signer.sign(&user)?;

        info!(user = %user.uuid, "session issued");

        Ok(LoginSession {
            token,
            expires_in: self.signer.ttl_seconds(),
            user,
        })
    }

    #[instrument(skip_all, err(level = "debug"))]
    async fn authenticate_bearer(&self, token: &str) -> Result<Principal, AuthServiceError> {
        let claims = self.signer.verify(token).map_err(|error| {
            debug!(%error, "bearer token rejected");

            AuthServiceError::InvalidCredentials
        })?;

        let mut tx = self.db.begin_transaction().await?;

        let user = self
            .users
            .find_user(&mut tx, claims.sub)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        tx.commit().await?;

        Ok(Principal {
            authorities: authorities_for(&user),
            user_uuid: user.uuid,
            email: user.email,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue a session token.
    async fn login(&self, credentials: Credentials) -> Result<LoginSession, AuthServiceError>;

    /// Resolve a bearer token into the caller and their current authorities.
    async fn authenticate_bearer(&self, token: &str) -> Result<Principal, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use crate::{
        domain::users::{UsersService, data::UserUpdate},
        test::{TestContext, helpers::create_user},
    };

    use super::*;

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: Password::new(password),
        }
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;

        let session = ctx
            .auth
            .login(credentials("ADA@example.com", "password123"))
            .await?;

        let principal = ctx.auth.authenticate_bearer(&session.token).await?;

        assert_eq!(session.user.uuid, user.uuid);
        assert_eq!(session.expires_in, 3600);
        assert_eq!(principal.user_uuid, user.uuid);
        assert!(principal.has_authority("ROLE_CUSTOMER"));

        Ok(())
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        create_user(&ctx, "ada@example.com").await?;

        let result = ctx
            .auth
            .login(credentials("ada@example.com", "not-the-password"))
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::InvalidCredentials)),
            "expected InvalidCredentials, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx
            .auth
            .login(credentials("nobody@example.com", "password123"))
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::InvalidCredentials)),
            "expected InvalidCredentials, got {result:?}"
        );
    }

    #[tokio::test]
    async fn authorities_follow_role_changes_without_new_token() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;

        let session = ctx
            .auth
            .login(credentials("ada@example.com", "password123"))
            .await?;

        ctx.users
            .update_user(
                user.uuid,
                UserUpdate {
                    role: Some("seller".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await?;

        let principal = ctx.auth.authenticate_bearer(&session.token).await?;

        assert!(principal.has_authority("ROLE_SELLER"));
        assert!(principal.has_authority("PRODUCT_CREATE"));
        assert!(!principal.has_authority("ROLE_CUSTOMER"));

        Ok(())
    }

    #[tokio::test]
    async fn token_of_deleted_user_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;

        let session = ctx
            .auth
            .login(credentials("ada@example.com", "password123"))
            .await?;

        ctx.users.delete_user(user.uuid).await?;

        let result = ctx.auth.authenticate_bearer(&session.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::InvalidCredentials)),
            "expected InvalidCredentials, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn expired_token_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;

        let token = ctx.signer.sign_at(
            user.uuid,
            &user.email,
            Timestamp::now() - SignedDuration::from_hours(3),
        )?;

        let result = ctx.auth.authenticate_bearer(&token).await;

        assert!(
            matches!(result, Err(AuthServiceError::InvalidCredentials)),
            "expected InvalidCredentials, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn principal_authority_checks() {
        let principal = Principal {
            user_uuid: UserUuid::new(),
            email: "ada@example.com".to_string(),
            authorities: ["ROLE_SELLER".to_string(), "PRODUCT_CREATE".to_string()]
                .into_iter()
                .collect(),
        };

        assert!(principal.has_authority("PRODUCT_CREATE"));
        assert!(!principal.has_authority("PRODUCT_DELETE"));
        assert!(principal.has_any_authority(&["ROLE_ADMIN", "ROLE_SELLER"]));
        assert!(!principal.has_any_authority(&["ROLE_ADMIN"]));
    }
}
