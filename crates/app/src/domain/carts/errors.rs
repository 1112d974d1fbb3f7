//! Carts service errors.

use thiserror::Error;

use crate::domain::products::StockError;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("product not found")]
    ProductNotFound,

    #[error("insufficient stock, {available} available")]
    InsufficientStock { available: u32 },

    #[error("cart item not found")]
    LineNotFound,

    #[error("cart item belongs to another cart")]
    OwnershipViolation,

    #[error("invalid value for `{field}`")]
    Validation { field: &'static str },

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}

impl From<StockError> for CartsServiceError {
    fn from(error: StockError) -> Self {
        match error {
            StockError::ProductNotFound => Self::ProductNotFound,
            StockError::InsufficientStock { available, .. } => Self::InsufficientStock { available },
            StockError::Sql(error) => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_shortfall_keeps_available_count() {
        let error = CartsServiceError::from(StockError::InsufficientStock {
            requested: 6,
            available: 5,
        });

        assert!(
            matches!(error, CartsServiceError::InsufficientStock { available: 5 }),
            "expected InsufficientStock, got {error:?}"
        );
        assert_eq!(error.to_string(), "insufficient stock, 5 available");
    }

    #[test]
    fn missing_product_maps_to_product_not_found() {
        let error = CartsServiceError::from(StockError::ProductNotFound);

        assert!(matches!(error, CartsServiceError::ProductNotFound));
    }
}
