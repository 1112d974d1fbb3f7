//! Update Product Handler

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

use tienda_app::domain::products::data::ProductUpdate;

use crate::{
    auth::guard::require_any_authority,
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

/// Update Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateProductRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image: String,
    pub price: u64,
    pub stock: u32,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(request: UpdateProductRequest) -> Self {
        ProductUpdate {
            name: request.name,
            category: request.category,
            description: request.description,
            image: request.image,
            price: request.price,
            stock: request.stock,
        }
    }
}

/// Product Update Handler
#[endpoint(
    tags("products"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Forbidden"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot),
    fields(
        product_uuid = tracing::field::Empty,
        price = tracing::field::Empty,
        stock = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    require_any_authority(depot.principal_or_401()?, &["PRODUCT_UPDATE"])?;

    let request = json.into_inner();
    let product = product.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));
    span.record("price", request.price);
    span.record("stock", request.stock);

    let updated = state
        .app
        .products
        .update_product(product.into(), request.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, price = updated.price, "updated product");

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use tienda_app::domain::products::{ProductsServiceError, records::ProductUuid};

    use crate::test_helpers::{TestServices, admin, customer, make_product};

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}").put(handler)
    }

    fn payload() -> Value {
        json!({
            "name": "Catan",
            "category": "Board Games",
            "image": "https://img.example/catan.png",
            "price": 2_000,
            "stock": 9,
        })
    }

    #[tokio::test]
    async fn test_update_product_success() -> TestResult {
        let uuid = ProductUuid::new();

        let mut product = make_product(uuid);

        product.price = 2_000;
        product.stock = 9;

        let mut services = TestServices::default();

        services
            .products
            .expect_update_product()
            .once()
            .withf(move |u, update| *u == uuid && update.price == 2_000 && update.stock == 9)
            .return_once(move |_, _| Ok(product));

        let mut res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&payload())
            .send(&services.serve_as(admin(), route()))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.price, 2_000);
        assert_eq!(body.stock, 9);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_without_permission_returns_403() -> TestResult {
        let mut services = TestServices::default();

        services.products.expect_update_product().never();

        let res = TestClient::put(format!(
            "http://example.com/products/{}",
            ProductUuid::new()
        ))
        .json(&payload())
        .send(&services.serve_as(customer(), route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_invalid_uuid_returns_400() -> TestResult {
        let mut services = TestServices::default();

        services.products.expect_update_product().never();

        let res = TestClient::put("http://example.com/products/123")
            .json(&payload())
            .send(&services.serve_as(admin(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product_returns_404() -> TestResult {
        let mut services = TestServices::default();

        services
            .products
            .expect_update_product()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::NotFound));

        let res = TestClient::put(format!(
            "http://example.com/products/{}",
            ProductUuid::new()
        ))
        .json(&payload())
        .send(&services.serve_as(admin(), route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
