//! Users Repository

use std::collections::HashMap;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::users::records::{Role, RoleRecord, UserRecord, UserUuid};

const LIST_USERS_SQL: &str = include_str!("sql/list_users.sql");
const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const UPDATE_USER_SQL: &str = include_str!("sql/update_user.sql");
const DELETE_USER_SQL: &str = include_str!("sql/delete_user.sql");
const ASSIGN_USER_ROLES_SQL: &str = include_str!("sql/assign_user_roles.sql");
const CLEAR_USER_ROLES_SQL: &str = include_str!("sql/clear_user_roles.sql");
const LIST_USER_ROLES_SQL: &str = include_str!("sql/list_user_roles.sql");

/// Column values for a new user row.
#[derive(Debug, Clone)]
pub(crate) struct UserRow<'a> {
    pub uuid: UserUuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub national_id: Option<&'a str>,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub region: Option<&'a str>,
    pub commune: Option<&'a str>,
    pub role: Role,
}

/// Column values to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub(crate) struct UserChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub national_id: Option<&'a str>,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub region: Option<&'a str>,
    pub commune: Option<&'a str>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_users(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<UserRecord>, sqlx::Error> {
        let mut users = query_as::<Postgres, UserRecord>(LIST_USERS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        self.attach_roles(tx, &mut users).await?;

        Ok(users)
    }

    pub(crate) async fn find_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        let found = query_as::<Postgres, UserRecord>(FIND_USER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        self.with_roles(tx, found).await
    }

    pub(crate) async fn find_user_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        let found = query_as::<Postgres, UserRecord>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?;

        self.with_roles(tx, found).await
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        row: UserRow<'_>,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(row.uuid.into_uuid())
            .bind(row.first_name)
            .bind(row.last_name)
            .bind(row.email)
            .bind(row.password_hash)
            .bind(row.national_id)
            .bind(row.address)
            .bind(row.phone)
            .bind(row.region)
            .bind(row.commune)
            .bind(row.role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        changes: UserChanges<'_>,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(UPDATE_USER_SQL)
            .bind(user.into_uuid())
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.national_id)
            .bind(changes.address)
            .bind(changes.phone)
            .bind(changes.region)
            .bind(changes.commune)
            .bind(changes.role.map(Role::as_str))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_USER_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Replace the user's role set.
    pub(crate) async fn set_roles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        roles: &[Role],
    ) -> Result<(), sqlx::Error> {
        let names: Vec<&str> = roles.iter().copied().map(Role::as_str).collect();

        query(CLEAR_USER_ROLES_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        query(ASSIGN_USER_ROLES_SQL)
            .bind(user.into_uuid())
            .bind(names)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Load roles and their permissions for a freshly read user.
    pub(crate) async fn with_roles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: Option<UserRecord>,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        let Some(user) = user else {
            return Ok(None);
        };

        let mut users = [user];

        self.attach_roles(tx, &mut users).await?;

        let [user] = users;

        Ok(Some(user))
    }

    async fn attach_roles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        users: &mut [UserRecord],
    ) -> Result<(), sqlx::Error> {
        if users.is_empty() {
            return Ok(());
        }

        let uuids: Vec<Uuid> = users.iter().map(|user| user.uuid.into_uuid()).collect();

        let rows: Vec<(Uuid, String, Option<String>)> = query_as(LIST_USER_ROLES_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut roles: HashMap<Uuid, Vec<RoleRecord>> = HashMap::new();

        // Rows arrive ordered by user then role, so each role's rows are adjacent.
        for (user_uuid, role_name, permission) in rows {
            let user_roles = roles.entry(user_uuid).or_default();

            if user_roles.last().is_none_or(|role| role.name != role_name) {
                user_roles.push(RoleRecord {
                    name: role_name,
                    permissions: Vec::new(),
                });
            }

            if let (Some(role), Some(permission)) = (user_roles.last_mut(), permission) {
                role.permissions.push(permission);
            }
        }

        for user in users {
            user.roles = roles.remove(user.uuid.as_uuid()).unwrap_or_default();
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            national_id: row.try_get("national_id")?,
            address: row.try_get("address")?,
            phone: row.try_get("phone")?,
            region: row.try_get("region")?,
            commune: row.try_get("commune")?,
            role: row.try_get("role")?,
            roles: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
