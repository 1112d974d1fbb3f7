//! Create Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use tienda_app::domain::carts::data::NewCartItem;

use crate::{
    carts::{errors::observe_mutation, get::CartResponse},
    extensions::*,
    observability::CartOperation,
    state::State,
};

/// Create Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCartItemRequest {
    /// The product to add
    pub product_uuid: Uuid,

    /// Units to add; defaults to 1
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl From<CreateCartItemRequest> for NewCartItem {
    fn from(request: CreateCartItemRequest) -> Self {
        NewCartItem {
            product_uuid: request.product_uuid.into(),
            quantity: request.quantity,
        }
    }
}

/// Create Cart Item Handler
///
/// Adds units of a product to the caller's cart, merging into the existing
/// line for that product.
#[endpoint(
    tags("carts"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Item added"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;
    let item: NewCartItem = json.into_inner().into();
    let product = item.product_uuid;

    let cart = observe_mutation(
        CartOperation::AddItem,
        state.app.carts.add_item(user, item).await,
    )?;

    match cart.items.iter().find(|line| line.product_uuid == product) {
        Some(line) => {
            res.created_at(format_args!("/cart/items/{}", line.uuid))?;
        }
        None => {
            res.status_code(StatusCode::CREATED);
        }
    }

    info!(user = %user, product = %product, "added item to cart");

    Ok(Json(CartResponse::try_from(cart)?))
}
