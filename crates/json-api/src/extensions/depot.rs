//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use tienda_app::auth::Principal;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// Store the authenticated caller for downstream handlers.
    fn insert_principal(&mut self, principal: Principal);

    /// The authenticated caller, if the bearer middleware ran.
    fn principal(&self) -> Option<&Principal>;

    fn principal_or_401(&self) -> Result<&Principal, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.inject(principal);
    }

    fn principal(&self) -> Option<&Principal> {
        self.obtain::<Principal>().ok()
    }

    fn principal_or_401(&self) -> Result<&Principal, StatusError> {
        self.principal()
            .ok_or_else(|| StatusError::unauthorized().brief("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use salvo::http::StatusCode;
    use tienda_app::domain::users::records::UserUuid;

    use super::*;

    #[test]
    fn principal_round_trips_through_depot() {
        let mut depot = Depot::new();
        let user_uuid = UserUuid::new();

        depot.insert_principal(Principal {
            user_uuid,
            email: "ada@example.com".to_string(),
            authorities: BTreeSet::new(),
        });

        let principal = depot.principal_or_401().map(|principal| principal.user_uuid);

        assert_eq!(principal.ok(), Some(user_uuid));
    }

    #[test]
    fn missing_principal_is_unauthorized() {
        let depot = Depot::new();

        let result = depot.principal_or_401();

        assert_eq!(
            result.err().map(|error| error.code),
            Some(StatusCode::UNAUTHORIZED)
        );
    }
}
