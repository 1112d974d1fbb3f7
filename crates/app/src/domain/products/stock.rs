//! Stock Ledger
//!
//! Read-only availability checks over the product catalogue. The ledger
//! never reserves or decrements stock: a cart line is a soft claim that is
//! validated when it is written, so two shoppers can both hold the last unit
//! until checkout.

use sqlx::{Postgres, Transaction};
use thiserror::Error;
use tracing::warn;

use crate::domain::products::{
    records::{ProductRecord, ProductUuid},
    repository::PgProductsRepository,
};

#[derive(Debug, Error)]
pub enum StockError {
    #[error("product not found")]
    ProductNotFound,

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u64, available: u32 },

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StockLedger {
    products: PgProductsRepository,
}

impl StockLedger {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            products: PgProductsRepository::new(),
        }
    }

    /// Load a live product and confirm it can cover `requested` units.
    ///
    /// Runs inside the caller's transaction and writes nothing.
    pub(crate) async fn check_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        requested: u64,
    ) -> Result<ProductRecord, StockError> {
        let record = self
            .products
            .find_product(tx, product)
            .await?
            .ok_or(StockError::ProductNotFound)?;

        ensure_available(&record, requested).inspect_err(|_| {
            warn!(
                product = %product,
                requested,
                available = record.stock,
                "stock check rejected"
            );
        })?;

        Ok(record)
    }
}

/// Compare a requested quantity against the product's current stock.
///
/// # Errors
///
/// Returns [`StockError::InsufficientStock`] when `requested` exceeds stock.
pub fn ensure_available(product: &ProductRecord, requested: u64) -> Result<(), StockError> {
    if requested > u64::from(product.stock) {
        return Err(StockError::InsufficientStock {
            requested,
            available: product.stock,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        domain::products::{ProductsService, data::ProductUpdate},
        test::{TestContext, helpers::create_product},
    };

    use super::*;

    fn product_with_stock(stock: u32) -> ProductRecord {
        ProductRecord {
            uuid: ProductUuid::new(),
            name: "Dixit".to_string(),
            category: "Board Games".to_string(),
            description: None,
            image: "https://img.example/dixit.png".to_string(),
            price: 1_000,
            stock,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn requesting_exactly_the_stock_is_allowed() {
        assert!(ensure_available(&product_with_stock(5), 5).is_ok());
    }

    #[test]
    fn requesting_more_than_stock_reports_available() {
        let result = ensure_available(&product_with_stock(5), 6);

        assert!(
            matches!(
                result,
                Err(StockError::InsufficientStock {
                    requested: 6,
                    available: 5
                })
            ),
            "expected InsufficientStock, got {result:?}"
        );
    }

    #[test]
    fn zero_is_always_available() {
        assert!(ensure_available(&product_with_stock(0), 0).is_ok());
    }

    #[tokio::test]
    async fn check_available_returns_product() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 1_000, 3).await?;

        let mut tx = ctx.db.begin_test_transaction().await;

        let checked = StockLedger::new()
            .check_available(&mut tx, product.uuid, 3)
            .await?;

        assert_eq!(checked.uuid, product.uuid);
        assert_eq!(checked.stock, 3);

        Ok(())
    }

    #[tokio::test]
    async fn check_available_unknown_product_is_not_found() {
        let ctx = TestContext::new().await;
        let mut tx = ctx.db.begin_test_transaction().await;

        let result = StockLedger::new()
            .check_available(&mut tx, ProductUuid::new(), 1)
            .await;

        assert!(
            matches!(result, Err(StockError::ProductNotFound)),
            "expected ProductNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn check_available_ignores_deleted_products() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 1_000, 3).await?;

        ctx.products.delete_product(product.uuid).await?;

        let mut tx = ctx.db.begin_test_transaction().await;

        let result = StockLedger::new()
            .check_available(&mut tx, product.uuid, 1)
            .await;

        assert!(
            matches!(result, Err(StockError::ProductNotFound)),
            "expected ProductNotFound for a deleted product, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn check_available_reads_current_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 1_000, 3).await?;

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: product.name.clone(),
                    category: product.category.clone(),
                    description: product.description.clone(),
                    image: product.image.clone(),
                    price: product.price,
                    stock: 1,
                },
            )
            .await?;

        let mut tx = ctx.db.begin_test_transaction().await;

        let result = StockLedger::new()
            .check_available(&mut tx, product.uuid, 2)
            .await;

        assert!(
            matches!(
                result,
                Err(StockError::InsufficientStock {
                    requested: 2,
                    available: 1
                })
            ),
            "expected InsufficientStock after restock down, got {result:?}"
        );

        Ok(())
    }
}
