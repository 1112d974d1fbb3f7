//! Cart Total Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Cart Total Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartTotalResponse {
    /// Sum of `quantity * unit_price` over the cart's lines
    pub total: u64,
}

/// Cart Total Handler
#[endpoint(
    tags("carts"),
    summary = "Cart Total",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Current cart total"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartTotalResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;

    let total = state
        .app
        .carts
        .calculate_total(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartTotalResponse { total }))
}
