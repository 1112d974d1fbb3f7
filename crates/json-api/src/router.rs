//! App Router

use salvo::Router;

use crate::{auth, carts, healthcheck, observability::metrics_handler, products, users};

/// Every API route; reads of the catalog, login and registration are public.
pub fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(Router::with_path("login").post(auth::login::handler))
        .push(Router::with_path("users/register").post(users::register::handler))
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("products")
                        .post(products::create::handler)
                        .push(
                            Router::with_path("{product}")
                                .put(products::update::handler)
                                .delete(products::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("users")
                        .get(users::index::handler)
                        .post(users::create::handler)
                        .push(
                            Router::with_path("{user}")
                                .get(users::get::handler)
                                .put(users::update::handler)
                                .delete(users::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("cart")
                        .get(carts::get::handler)
                        .delete(carts::clear::handler)
                        .push(Router::with_path("total").get(carts::total::handler))
                        .push(
                            Router::with_path("items")
                                .post(carts::items::create::handler)
                                .push(
                                    Router::with_path("{item}")
                                        .put(carts::items::update::handler)
                                        .delete(carts::items::delete::handler),
                                ),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        http::header::AUTHORIZATION,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;

    use tienda_app::{
        auth::AuthServiceError,
        domain::{carts::CartsServiceError, products::records::ProductUuid},
    };

    use crate::test_helpers::{TestServices, customer, make_product};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(services.into_state()))
                .push(app_router()),
        )
    }

    #[tokio::test]
    async fn test_catalog_reads_need_no_token() -> TestResult {
        let uuid = ProductUuid::new();

        let mut services = TestServices::default();

        services.auth.expect_authenticate_bearer().never();

        services
            .products
            .expect_get_product()
            .once()
            .return_once(|uuid| Ok(make_product(uuid)));

        let res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_writes_need_a_token() -> TestResult {
        let mut services = TestServices::default();

        services.products.expect_create_product().never();

        let res = TestClient::post("http://example.com/products")
            .json(&json!({ "name": "Catan" }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_rejects_invalid_token() -> TestResult {
        let mut services = TestServices::default();

        services
            .auth
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::InvalidCredentials));

        services.carts.expect_get_or_create_cart().never();

        let res = TestClient::get("http://example.com/cart")
            .add_header(AUTHORIZATION, "Bearer expired", true)
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_healthcheck_is_public() -> TestResult {
        let res = TestClient::get("http://example.com/healthcheck")
            .send(&make_service(TestServices::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_stock_rejection_is_scraped_from_metrics() -> TestResult {
        let mut services = TestServices::default();

        services
            .auth
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Ok(customer()));

        services
            .carts
            .expect_add_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::InsufficientStock { available: 1 }));

        let service = make_service(services);

        let res = TestClient::post("http://example.com/cart/items")
            .add_header(AUTHORIZATION, "Bearer valid", true)
            .json(&json!({ "product_uuid": ProductUuid::new().into_uuid(), "quantity": 2 }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        let body = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        assert!(
            body.contains(r#"tienda_json_cart_stock_rejections_total{operation="add_item"}"#),
            "expected add_item stock rejection, got:\n{body}"
        );

        Ok(())
    }
}
