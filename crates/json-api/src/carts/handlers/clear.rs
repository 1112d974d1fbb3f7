//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{
    carts::errors::observe_mutation, extensions::*, observability::CartOperation, state::State,
};

/// Clear Cart Handler
///
/// Removes every line from the caller's cart. The cart itself is kept.
#[endpoint(
    tags("carts"),
    summary = "Clear Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart cleared"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;

    observe_mutation(
        CartOperation::Clear,
        state.app.carts.clear_cart(user).await,
    )?;

    info!(user = %user, "cleared cart");

    Ok(StatusCode::OK)
}
