//! Users service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, instrument};

use crate::{
    auth::password::hash_password,
    database::Db,
    domain::users::{
        data::{NewUser, UserUpdate},
        errors::UsersServiceError,
        records::{Role, UserRecord, UserUuid},
        repository::{PgUsersRepository, UserChanges, UserRow},
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    #[instrument(skip(self, user), fields(user = %user.uuid), err)]
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        user.validate()?;

        let role = Role::from_requested(user.role.as_deref());

        let mut roles = vec![role];

        if user.admin && role != Role::Admin {
            roles.push(Role::Admin);
        }

        let password_hash = hash_password(&user.password)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .repository
            .create_user(
                &mut tx,
                UserRow {
                    uuid: user.uuid,
                    first_name: &user.first_name,
                    last_name: &user.last_name,
                    email: &user.email,
                    password_hash: &password_hash,
                    national_id: user.national_id.as_deref(),
                    address: user.address.as_deref(),
                    phone: user.phone.as_deref(),
                    region: user.region.as_deref(),
                    commune: user.commune.as_deref(),
                    role,
                },
            )
            .await?;

        self.repository.set_roles(&mut tx, created.uuid, &roles).await?;

        let created = self
            .repository
            .with_roles(&mut tx, Some(created))
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        info!(role = role.as_str(), admin = user.admin, "user created");

        Ok(created)
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self) -> Result<Vec<UserRecord>, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let users = self.repository.list_users(&mut tx).await?;

        tx.commit().await?;

        Ok(users)
    }

    #[instrument(skip(self), fields(user = %user), err)]
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let user = self
            .repository
            .find_user(&mut tx, user)
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(user)
    }

    #[instrument(skip(self, update), fields(user = %user), err)]
    async fn update_user(
        &self,
        user: UserUuid,
        update: UserUpdate,
    ) -> Result<UserRecord, UsersServiceError> {
        let update = update.normalized()?;

        let role = update
            .role
            .as_deref()
            .map(|requested| Role::from_requested(Some(requested)));

        let password_hash = update.password.as_ref().map(hash_password).transpose()?;

        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .repository
            .update_user(
                &mut tx,
                user,
                UserChanges {
                    first_name: update.first_name.as_deref(),
                    last_name: update.last_name.as_deref(),
                    email: update.email.as_deref(),
                    password_hash: password_hash.as_deref(),
                    national_id: update.national_id.as_deref(),
                    address: update.address.as_deref(),
                    phone: update.phone.as_deref(),
                    region: update.region.as_deref(),
                    commune: update.commune.as_deref(),
                    role,
                },
            )
            .await?;

        if let Some(role) = role {
            self.repository.set_roles(&mut tx, user, &[role]).await?;
        }

        let updated = self
            .repository
            .with_roles(&mut tx, Some(updated))
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        info!(
            role_changed = role.is_some(),
            password_changed = password_hash.is_some(),
            "user updated"
        );

        Ok(updated)
    }

    #[instrument(skip(self), fields(user = %user), err)]
    async fn delete_user(&self, user: UserUuid) -> Result<(), UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.repository.delete_user(&mut tx, user).await?;

        if rows_affected == 0 {
            return Err(UsersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Register a user, hashing the password and assigning roles.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Retrieves all users.
    async fn list_users(&self) -> Result<Vec<UserRecord>, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;

    /// Apply a partial update.
    async fn update_user(
        &self,
        user: UserUuid,
        update: UserUpdate,
    ) -> Result<UserRecord, UsersServiceError>;

    /// Delete a user together with their cart.
    async fn delete_user(&self, user: UserUuid) -> Result<(), UsersServiceError>;
}
