//! Update User Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use tienda_app::{auth::password::Password, domain::users::data::UserUpdate};

use crate::{
    auth::guard::{ROLE_ADMIN, require_any_authority, require_self_or_any_authority},
    extensions::*,
    state::State,
    users::{errors::into_status_error, get::UserResponse},
};

/// Update User Request
///
/// Missing or blank fields keep their stored values.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub commune: Option<String>,

    /// Replaces every assigned role; admins only
    pub role: Option<String>,
}

impl UpdateUserRequest {
    fn changes_role(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| !role.trim().is_empty())
    }
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(request: UpdateUserRequest) -> Self {
        UserUpdate {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password.map(Password::new),
            national_id: request.national_id,
            address: request.address,
            phone: request.phone,
            region: request.region,
            commune: request.commune,
            role: request.role,
        }
    }
}

/// Update User Handler
///
/// Users can update themselves; admins can update anyone and change roles.
#[endpoint(
    tags("users"),
    summary = "Update User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "User updated"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::CONFLICT, description = "Email already registered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Forbidden"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    json: JsonBody<UpdateUserRequest>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let user = user.into_inner().into();
    let request = json.into_inner();

    require_self_or_any_authority(principal, user, &[ROLE_ADMIN])?;

    if request.changes_role() {
        require_any_authority(principal, &[ROLE_ADMIN])?;
    }

    let updated = state
        .app
        .users
        .update_user(user, request.into())
        .await
        .map_err(into_status_error)?;

    info!(user = %updated.uuid, "updated user");

    Ok(Json(updated.into()))
}
