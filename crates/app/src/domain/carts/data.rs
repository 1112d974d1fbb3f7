//! Cart Data

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        records::{CartItemUuid, CartUuid},
    },
    products::records::ProductUuid,
};

/// A request to put a product into the caller's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,

    /// Units to add; one when omitted.
    pub quantity: Option<i64>,
}

impl NewCartItem {
    /// The requested quantity, defaulted and range checked.
    pub(crate) fn requested_quantity(&self) -> Result<u32, CartsServiceError> {
        let quantity = self.quantity.unwrap_or(1);

        if quantity < 1 {
            return Err(CartsServiceError::Validation { field: "quantity" });
        }

        u32::try_from(quantity)
            .ok()
            .ok_or(CartsServiceError::Validation { field: "quantity" })
    }
}

/// Row data for a line that is not yet in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewCartLine {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: Option<i64>) -> NewCartItem {
        NewCartItem {
            product_uuid: ProductUuid::new(),
            quantity,
        }
    }

    #[test]
    fn missing_quantity_defaults_to_one() {
        assert_eq!(item(None).requested_quantity().ok(), Some(1));
    }

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        for quantity in [0, -1, i64::MIN] {
            let result = item(Some(quantity)).requested_quantity();

            assert!(
                matches!(
                    result,
                    Err(CartsServiceError::Validation { field: "quantity" })
                ),
                "expected validation error for {quantity}, got {result:?}"
            );
        }
    }

    #[test]
    fn quantity_beyond_u32_is_rejected() {
        let result = item(Some(i64::from(u32::MAX) + 1)).requested_quantity();

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Validation { field: "quantity" })
            ),
            "expected validation error, got {result:?}"
        );
    }
}
