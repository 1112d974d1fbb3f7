//! Get User Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tienda_app::domain::users::records::UserRecord;

use crate::{
    auth::guard::{ROLE_ADMIN, ROLE_SELLER, require_self_or_any_authority},
    extensions::*,
    state::State,
    users::errors::into_status_error,
};

/// User Response
///
/// Never includes the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserResponse {
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub commune: Option<String>,

    /// Role the user was created or last updated with
    pub role: String,

    /// Every role currently assigned
    pub roles: Vec<String>,

    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            uuid: user.uuid.into(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            national_id: user.national_id,
            address: user.address,
            phone: user.phone,
            region: user.region,
            commune: user.commune,
            role: user.role,
            roles: user.roles.into_iter().map(|role| role.name).collect(),
            created_at: user.created_at.to_string(),
            updated_at: user.updated_at.to_string(),
        }
    }
}

/// Get User Handler
///
/// Users can read themselves; admins and sellers can read anyone.
#[endpoint(
    tags("users"),
    summary = "Get User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "User found"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Forbidden"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = user.into_inner().into();

    require_self_or_any_authority(depot.principal_or_401()?, user, &[ROLE_ADMIN, ROLE_SELLER])?;

    let user = state
        .app
        .users
        .get_user(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}
