//! Authorities
//!
//! A user's authorities are the names of their roles plus every permission
//! granted by those roles. They are derived from the stored user on each
//! request and never persisted.

use std::collections::BTreeSet;

use crate::domain::users::records::UserRecord;

#[must_use]
pub fn authorities_for(user: &UserRecord) -> BTreeSet<String> {
    user.roles
        .iter()
        .flat_map(|role| std::iter::once(&role.name).chain(&role.permissions))
        .cloned()
        .collect()
}
