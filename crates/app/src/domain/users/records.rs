//! User Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub commune: Option<String>,
    /// Name of the role the user was created or last updated with.
    pub role: String,
    pub roles: Vec<RoleRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Role Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub name: String,
    pub permissions: Vec<String>,
}

/// Roles a user can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Seller,
    Customer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ROLE_ADMIN",
            Self::Seller => "ROLE_SELLER",
            Self::Customer => "ROLE_CUSTOMER",
        }
    }

    /// Map a caller supplied role name onto a role.
    ///
    /// Matching ignores case and an optional `ROLE_` prefix. Anything
    /// unrecognised, blank or missing becomes [`Role::Customer`].
    #[must_use]
    pub fn from_requested(requested: Option<&str>) -> Self {
        let Some(requested) = requested.map(str::trim) else {
            return Self::Customer;
        };

        let upper = requested.to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);

        match name {
            "ADMIN" => Self::Admin,
            "SELLER" => Self::Seller,
            _ => Self::Customer,
        }
    }
}
