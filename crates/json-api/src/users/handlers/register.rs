//! Register User Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use tienda_app::{
    auth::password::Password,
    domain::users::{data::NewUser, records::UserUuid},
};

use crate::{
    extensions::*,
    state::State,
    users::{create::create, get::UserResponse},
};

/// Register User Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterUserRequest {
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
}

/// Self-registration always yields a plain customer.
impl From<RegisterUserRequest> for NewUser {
    fn from(request: RegisterUserRequest) -> Self {
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
            role: None,
            admin: false,
        }
    }
}

/// Register User Handler
#[endpoint(
    tags("users"),
    summary = "Register",
    responses(
        (status_code = StatusCode::CREATED, description = "User registered"),
        (status_code = StatusCode::CONFLICT, description = "Email already registered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterUserRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    create(state, json.into_inner().into(), res).await
}
