//! Users Data

use crate::{
    auth::password::Password,
    domain::users::{errors::UsersServiceError, records::UserUuid},
};

const MAX_TEXT_LEN: usize = 255;

/// New User Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Password,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub commune: Option<String>,

    /// Requested role name, mapped onto a known role.
    pub role: Option<String>,

    /// Additionally grant the admin role.
    pub admin: bool,
}

/// Partial user update.
///
/// Only fields that are present and non-blank overwrite stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Password>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub commune: Option<String>,
    pub role: Option<String>,
}

impl NewUser {
    pub(crate) fn validate(&self) -> Result<(), UsersServiceError> {
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)?;
        email("email", &self.email)?;

        if !self.password.is_acceptable() {
            return Err(UsersServiceError::Validation { field: "password" });
        }

        for (field, value) in [
            ("national_id", &self.national_id),
            ("address", &self.address),
            ("phone", &self.phone),
            ("region", &self.region),
            ("commune", &self.commune),
        ] {
            optional(field, value.as_deref())?;
        }

        Ok(())
    }
}

impl UserUpdate {
    /// Drop blank values so they keep the stored data, then validate the rest.
    pub(crate) fn normalized(self) -> Result<Self, UsersServiceError> {
        let update = Self {
            first_name: present(self.first_name),
            last_name: present(self.last_name),
            email: present(self.email),
            password: self.password.filter(|password| !password.is_blank()),
            national_id: present(self.national_id),
            address: present(self.address),
            phone: present(self.phone),
            region: present(self.region),
            commune: present(self.commune),
            role: present(self.role),
        };

        if let Some(value) = &update.email {
            email("email", value)?;
        }

        if update
            .password
            .as_ref()
            .is_some_and(|password| !password.is_acceptable())
        {
            return Err(UsersServiceError::Validation { field: "password" });
        }

        for (field, value) in [
            ("first_name", &update.first_name),
            ("last_name", &update.last_name),
            ("national_id", &update.national_id),
            ("address", &update.address),
            ("phone", &update.phone),
            ("region", &update.region),
            ("commune", &update.commune),
        ] {
            optional(field, value.as_deref())?;
        }

        Ok(update)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn required(field: &'static str, value: &str) -> Result<(), UsersServiceError> {
    if value.trim().is_empty() {
        return Err(UsersServiceError::Validation { field });
    }

    optional(field, Some(value))
}

fn optional(field: &'static str, value: Option<&str>) -> Result<(), UsersServiceError> {
    if value.is_some_and(|text| text.chars().count() > MAX_TEXT_LEN) {
        return Err(UsersServiceError::Validation { field });
    }

    Ok(())
}

fn email(field: &'static str, value: &str) -> Result<(), UsersServiceError> {
    required(field, value)?;

    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(UsersServiceError::Validation { field }),
    }
}
