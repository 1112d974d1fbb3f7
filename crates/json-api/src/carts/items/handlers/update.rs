//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::{errors::observe_mutation, get::CartResponse},
    extensions::*,
    observability::CartOperation,
    state::State,
};

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    /// New number of units; zero or less removes the item
    pub quantity: i64,
}

/// Update Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Update Cart Item Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item updated or removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item or product not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Cart item belongs to another cart"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart_items.update",
    skip(item, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        item_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;
    let item = item.into_inner();
    let quantity = json.into_inner().quantity;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("item_uuid", tracing::field::display(item));
    span.record("quantity", quantity);

    let cart = observe_mutation(
        CartOperation::UpdateQuantity,
        state.app.carts.update_item_quantity(user, item.into(), quantity).await,
    )?;

    tracing::info!(item_uuid = %item, quantity, "updated cart item");

    Ok(Json(CartResponse::try_from(cart)?))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use tienda_app::domain::{
        carts::{CartsServiceError, records::CartItemUuid},
        products::records::ProductUuid,
    };

    use crate::test_helpers::{TEST_USER_UUID, TestServices, customer, make_cart};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        services.serve_as(customer(), Router::with_path("cart/items/{item}").put(handler))
    }

    #[tokio::test]
    async fn test_update_item_success() -> TestResult {
        let cart = make_cart(&[(ProductUuid::new(), 4, 1_000)]);
        let item = cart
            .items
            .first()
            .map(|line| line.uuid)
            .ok_or("fixture cart has a line")?;

        let mut services = TestServices::default();

        services
            .carts
            .expect_update_item_quantity()
            .once()
            .withf(move |user, line, quantity| {
                *user == TEST_USER_UUID && *line == item && *quantity == 4
            })
            .return_once(move |_, _, _| Ok(cart));

        let mut res = TestClient::put(format!("http://example.com/cart/items/{item}"))
            .json(&json!({ "quantity": 4 }))
            .send(&make_service(services))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.total, 4_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_item_to_zero_returns_cart_without_line() -> TestResult {
        let item = CartItemUuid::new();

        let mut services = TestServices::default();

        services
            .carts
            .expect_update_item_quantity()
            .once()
            .withf(move |_, line, quantity| *line == item && *quantity == 0)
            .return_once(|_, _, _| Ok(make_cart(&[])));

        let mut res = TestClient::put(format!("http://example.com/cart/items/{item}"))
            .json(&json!({ "quantity": 0 }))
            .send(&make_service(services))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert!(body.items.is_empty());
        assert_eq!(body.total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_foreign_item_returns_403() -> TestResult {
        let mut services = TestServices::default();

        services
            .carts
            .expect_update_item_quantity()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::OwnershipViolation));

        let res = TestClient::put(format!(
            "http://example.com/cart/items/{}",
            CartItemUuid::new()
        ))
        .json(&json!({ "quantity": 2 }))
        .send(&make_service(services))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_item_invalid_uuid_returns_400() -> TestResult {
        let mut services = TestServices::default();

        services.carts.expect_update_item_quantity().never();

        let res = TestClient::put("http://example.com/cart/items/123")
            .json(&json!({ "quantity": 2 }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
