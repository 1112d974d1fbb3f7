//! Create User Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use tienda_app::{
    auth::password::Password,
    domain::users::{data::NewUser, records::UserUuid},
};

use crate::{
    auth::guard::{ROLE_ADMIN, require_any_authority},
    extensions::*,
    state::State,
    users::{errors::into_status_error, get::UserResponse},
};

/// Create User Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub commune: Option<String>,

    /// `admin`, `seller` or `customer`; anything else means customer
    #[serde(default)]
    pub role: Option<String>,

    /// Also grant the admin role
    #[serde(default)]
    pub admin: bool,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        NewUser {
            uuid: UserUuid::new(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: Password::new(request.password),
            national_id: request.national_id,
            address: request.address,
            phone: request.phone,
            region: request.region,
            commune: request.commune,
            role: request.role,
            admin: request.admin,
        }
    }
}

/// Persist a new user and answer with `201 Created`.
pub(super) async fn create(
    state: &State,
    user: NewUser,
    res: &mut Response,
) -> Result<Json<UserResponse>, StatusError> {
    let user = state
        .app
        .users
        .create_user(user)
        .await
        .map_err(into_status_error)?;

    res.created_at(format_args!("/users/{}", user.uuid))?;

    info!(user = %user.uuid, role = %user.role, "created user");

    Ok(Json(user.into()))
}

/// Create User Handler
///
/// Admin-only user creation with an explicit role.
#[endpoint(
    tags("users"),
    summary = "Create User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "User created"),
        (status_code = StatusCode::CONFLICT, description = "Email already registered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Forbidden"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateUserRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    require_any_authority(depot.principal_or_401()?, &[ROLE_ADMIN])?;

    create(state, json.into_inner().into(), res).await
}
