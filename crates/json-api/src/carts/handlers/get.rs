//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use tienda_app::domain::carts::records::{CartItemRecord, CartRecord};

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The owner of the cart
    pub user_uuid: Uuid,

    /// The items in the cart, oldest first
    pub items: Vec<CartItemResponse>,

    /// Sum of every line total, in minor currency units
    pub total: u64,

    /// Number of units across all lines
    pub item_count: u64,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl TryFrom<CartRecord> for CartResponse {
    type Error = StatusError;

    fn try_from(cart: CartRecord) -> Result<Self, Self::Error> {
        let Some(total) = cart.total() else {
            error!(cart = %cart.uuid, "cart total does not fit in a u64");

            return Err(StatusError::internal_server_error());
        };

        let item_count = cart.item_count();

        let items = cart
            .items
            .into_iter()
            .map(CartItemResponse::try_from)
            .collect::<Result<_, _>>()?;

        Ok(Self {
            uuid: cart.uuid.into(),
            user_uuid: cart.user_uuid.into(),
            items,
            total,
            item_count,
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        })
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The product in the cart item
    pub product_uuid: Uuid,

    /// Units of the product
    pub quantity: u32,

    /// Product price when the line was first added
    pub unit_price: u64,

    /// `quantity * unit_price`
    pub line_total: u64,

    /// The date and time the item was added
    pub created_at: String,

    /// The date and time the item was last updated
    pub updated_at: String,
}

impl TryFrom<CartItemRecord> for CartItemResponse {
    type Error = StatusError;

    fn try_from(item: CartItemRecord) -> Result<Self, Self::Error> {
        let Some(line_total) = item.line_total() else {
            error!(item = %item.uuid, "cart line total does not fit in a u64");

            return Err(StatusError::internal_server_error());
        };

        Ok(Self {
            uuid: item.uuid.into(),
            product_uuid: item.product_uuid.into(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total,
            created_at: item.created_at.to_string(),
            updated_at: item.updated_at.to_string(),
        })
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart, creating an empty one on first use.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;

    let cart = state
        .app
        .carts
        .get_or_create_cart(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::try_from(cart)?))
}
