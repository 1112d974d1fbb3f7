//! Delete Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    carts::{errors::observe_mutation, get::CartResponse},
    extensions::*,
    observability::CartOperation,
    state::State,
};

/// Delete Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Cart item belongs to another cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;
    let item = item.into_inner();

    let cart = observe_mutation(
        CartOperation::RemoveItem,
        state.app.carts.remove_item(user, item.into()).await,
    )?;

    info!(user = %user, item = %item, "removed cart item");

    Ok(Json(CartResponse::try_from(cart)?))
}
