//! Authority checks for handlers.

use salvo::http::StatusError;
use tienda_app::{auth::Principal, domain::users::records::UserUuid};

pub(crate) const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub(crate) const ROLE_SELLER: &str = "ROLE_SELLER";

pub(crate) fn require_any_authority(
    principal: &Principal,
    authorities: &[&str],
) -> Result<(), StatusError> {
    if principal.has_any_authority(authorities) {
        return Ok(());
    }

    Err(StatusError::forbidden().brief("Insufficient permissions"))
}

/// Allow the user acting on their own record, or a holder of any authority.
pub(crate) fn require_self_or_any_authority(
    principal: &Principal,
    user: UserUuid,
    authorities: &[&str],
) -> Result<(), StatusError> {
    if principal.user_uuid == user {
        return Ok(());
    }

    require_any_authority(principal, authorities)
}
