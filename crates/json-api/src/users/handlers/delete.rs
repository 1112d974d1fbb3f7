//! Delete User Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::guard::{ROLE_ADMIN, require_any_authority},
    extensions::*,
    state::State,
    users::errors::into_status_error,
};

/// Delete User Handler
///
/// Deleting a user also deletes their cart.
#[endpoint(
    tags("users"),
    summary = "Delete User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "User deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Forbidden"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    require_any_authority(depot.principal_or_401()?, &[ROLE_ADMIN])?;

    let user = user.into_inner();

    state
        .app
        .users
        .delete_user(user.into())
        .await
        .map_err(into_status_error)?;

    info!(user = %user, "deleted user");

    Ok(StatusCode::OK)
}
